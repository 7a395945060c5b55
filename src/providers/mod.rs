pub mod bot_csv;
pub mod taiwan_bank;

pub use taiwan_bank::TaiwanBankFeed;
