pub mod etherscan;
pub mod util;

pub use etherscan::{EtherscanClient, EtherscanProvider};
