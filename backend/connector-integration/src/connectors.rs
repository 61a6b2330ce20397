pub mod postfinance;

pub use self::postfinance::Postfinance;
