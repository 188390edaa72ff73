//! Display currencies. Selecting one only changes how amounts are labelled;
//! stored amounts are never converted.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub flag: &'static str,
    /// Locale tag, e.g. `en_IN`.
    pub locale: &'static str,
}

const fn c(
    code: &'static str,
    name: &'static str,
    symbol: &'static str,
    flag: &'static str,
    locale: &'static str,
) -> Currency {
    Currency { code, name, symbol, flag, locale }
}

pub const DEFAULT_CODE: &str = "INR";

pub const CURRENCIES: &[Currency] = &[
    c("INR", "Indian Rupee", "₹", "🇮🇳", "en_IN"),
    c("USD", "US Dollar", "$", "🇺🇸", "en_US"),
    c("EUR", "Euro", "€", "🇪🇺", "en_EU"),
    c("GBP", "British Pound", "£", "🇬🇧", "en_GB"),
    c("JPY", "Japanese Yen", "¥", "🇯🇵", "ja_JP"),
    c("CNY", "Chinese Yuan", "¥", "🇨🇳", "zh_CN"),
    c("AUD", "Australian Dollar", "A$", "🇦🇺", "en_AU"),
    c("CAD", "Canadian Dollar", "C$", "🇨🇦", "en_CA"),
    c("CHF", "Swiss Franc", "CHF", "🇨🇭", "de_CH"),
    c("SEK", "Swedish Krona", "kr", "🇸🇪", "sv_SE"),
    c("NZD", "New Zealand Dollar", "NZ$", "🇳🇿", "en_NZ"),
    c("SGD", "Singapore Dollar", "S$", "🇸🇬", "en_SG"),
    c("HKD", "Hong Kong Dollar", "HK$", "🇭🇰", "zh_HK"),
    c("KRW", "South Korean Won", "₩", "🇰🇷", "ko_KR"),
    c("NOK", "Norwegian Krone", "kr", "🇳🇴", "no_NO"),
    c("MXN", "Mexican Peso", "Mex$", "🇲🇽", "es_MX"),
    c("BRL", "Brazilian Real", "R$", "🇧🇷", "pt_BR"),
    c("ZAR", "South African Rand", "R", "🇿🇦", "en_ZA"),
    c("RUB", "Russian Ruble", "₽", "🇷🇺", "ru_RU"),
    c("TRY", "Turkish Lira", "₺", "🇹🇷", "tr_TR"),
    c("THB", "Thai Baht", "฿", "🇹🇭", "th_TH"),
    c("IDR", "Indonesian Rupiah", "Rp", "🇮🇩", "id_ID"),
    c("MYR", "Malaysian Ringgit", "RM", "🇲🇾", "ms_MY"),
    c("PHP", "Philippine Peso", "₱", "🇵🇭", "en_PH"),
    c("PLN", "Polish Zloty", "zł", "🇵🇱", "pl_PL"),
    c("DKK", "Danish Krone", "kr", "🇩🇰", "da_DK"),
    c("AED", "UAE Dirham", "د.إ", "🇦🇪", "ar_AE"),
    c("SAR", "Saudi Riyal", "﷼", "🇸🇦", "ar_SA"),
    c("ILS", "Israeli Shekel", "₪", "🇮🇱", "he_IL"),
    c("PKR", "Pakistani Rupee", "₨", "🇵🇰", "ur_PK"),
    c("BDT", "Bangladeshi Taka", "৳", "🇧🇩", "bn_BD"),
    c("LKR", "Sri Lankan Rupee", "Rs", "🇱🇰", "si_LK"),
    c("NPR", "Nepalese Rupee", "रू", "🇳🇵", "ne_NP"),
    c("VND", "Vietnamese Dong", "₫", "🇻🇳", "vi_VN"),
    c("EGP", "Egyptian Pound", "E£", "🇪🇬", "ar_EG"),
    c("NGN", "Nigerian Naira", "₦", "🇳🇬", "en_NG"),
    c("KES", "Kenyan Shilling", "KSh", "🇰🇪", "sw_KE"),
    c("CZK", "Czech Koruna", "Kč", "🇨🇿", "cs_CZ"),
    c("HUF", "Hungarian Forint", "Ft", "🇭🇺", "hu_HU"),
    c("RON", "Romanian Leu", "lei", "🇷🇴", "ro_RO"),
    c("CLP", "Chilean Peso", "$", "🇨🇱", "es_CL"),
    c("ARS", "Argentine Peso", "$", "🇦🇷", "es_AR"),
    c("COP", "Colombian Peso", "$", "🇨🇴", "es_CO"),
    c("PEN", "Peruvian Sol", "S/", "🇵🇪", "es_PE"),
];

pub fn by_code(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

pub fn default_currency() -> &'static Currency {
    by_code(DEFAULT_CODE).unwrap_or(&CURRENCIES[0])
}

/// Resolve a persisted code, falling back to the default for unknown ones.
pub fn resolve(code: &str) -> &'static Currency {
    by_code(code).unwrap_or_else(|| {
        tracing::warn!(code, "unknown currency in settings, using {DEFAULT_CODE}");
        default_currency()
    })
}
