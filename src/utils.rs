/// Raw token units per whole BDB (the contract uses 7 decimals).
pub const BALANCE_SCALE: i128 = 10_000_000;

/// Number of decimals shown for a balance.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Format a raw contract amount as a whole-token decimal string with two decimals.
///
/// Rounds half away from zero: `123456789` -> `"12.35"`, `0` -> `"0.00"`.
pub fn format_balance(raw: i128) -> String {
    let step = (BALANCE_SCALE / 10i128.pow(DISPLAY_DECIMALS)).unsigned_abs();
    let abs = raw.unsigned_abs();

    let mut units = abs / step;
    if (abs % step) * 2 >= step {
        units += 1;
    }

    let divisor = 10u128.pow(DISPLAY_DECIMALS);
    let formatted = format!(
        "{}.{:0width$}",
        units / divisor,
        units % divisor,
        width = DISPLAY_DECIMALS as usize
    );
    if raw < 0 && units != 0 {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Shorten an address to its first and last 8 characters.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 16 {
        return address.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}

/// True for a well-formed Stellar account strkey (G...).
pub fn is_valid_account(address: &str) -> bool {
    stellar_strkey::ed25519::PublicKey::from_string(address.trim()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== format_balance tests ====================

    #[test]
    fn test_format_balance_zero() {
        assert_eq!(format_balance(0), "0.00");
    }

    #[test]
    fn test_format_balance_rounds_up() {
        assert_eq!(format_balance(123_456_789), "12.35");
    }

    #[test]
    fn test_format_balance_rounds_down() {
        assert_eq!(format_balance(123_440_000), "12.34");
    }

    #[test]
    fn test_format_balance_whole_token() {
        assert_eq!(format_balance(10_000_000), "1.00");
    }

    #[test]
    fn test_format_balance_half_rounds_away_from_zero() {
        assert_eq!(format_balance(150_000), "0.02");
        assert_eq!(format_balance(-150_000), "-0.02");
    }

    #[test]
    fn test_format_balance_dust_is_zero() {
        assert_eq!(format_balance(1), "0.00");
        assert_eq!(format_balance(-1), "0.00");
    }

    #[test]
    fn test_format_balance_negative() {
        assert_eq!(format_balance(-123_456_789), "-12.35");
    }

    #[test]
    fn test_format_balance_large_supply() {
        // 1 billion BDB
        assert_eq!(format_balance(1_000_000_000 * BALANCE_SCALE), "1000000000.00");
    }

    #[test]
    fn test_format_balance_extremes_do_not_overflow() {
        assert_eq!(format_balance(i128::MAX), "17014118346046923173168730371588.41");
        assert!(format_balance(i128::MIN).starts_with('-'));
    }

    // ==================== short_address tests ====================

    #[test]
    fn test_short_address() {
        let addr = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";
        assert_eq!(short_address(addr), "GBRPYHIL...7QC7OX2H");
    }

    #[test]
    fn test_short_address_short_input_unchanged() {
        assert_eq!(short_address("GABC"), "GABC");
        assert_eq!(short_address(""), "");
    }

    // ==================== is_valid_account tests ====================

    #[test]
    fn test_is_valid_account() {
        assert!(is_valid_account("GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H"));
        assert!(is_valid_account("  GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H "));
    }

    #[test]
    fn test_is_valid_account_rejects_contract_and_garbage() {
        assert!(!is_valid_account("CAIRCEIRCEIRCEIRCEIRCEIRCEIRCEIRCEIRCEIRCEIRCEIRCEIRDB3V"));
        assert!(!is_valid_account("0x742d35Cc6634C0532925a3b844Bc454e4438f44e"));
        assert!(!is_valid_account(""));
    }
}
