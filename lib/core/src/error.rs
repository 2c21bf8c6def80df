//! Error handling foundation for flux agents.
//!
//! Only the `Result` alias lives here. Each crate defines its own error
//! enums and wraps them in a rootcause `Report` as they propagate.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_alias_carries_value() {
        let ok: Result<&str> = Ok("reply");
        assert_eq!(ok.expect("should be ok"), "reply");
    }
}
