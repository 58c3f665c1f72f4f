use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Starting capital used when no baseline is configured
pub const DEFAULT_BASELINE_CAPITAL: Decimal = dec!(24000);

/// Cash amount of the monthly performance window until it is edited
pub const DEFAULT_CASH_PARAMETER: Decimal = dec!(50000);

/// Storage key of the local asset snapshot
pub const CACHE_NAMESPACE: &str = "apex_coins";

/// Embedded images longer than this are swapped for a placeholder before caching
pub const CACHE_EMBEDDED_IMAGE_LIMIT: usize = 500_000;

/// Largest embedded image payload accepted on a mutation (5 MiB of characters)
pub const MAX_EMBEDDED_IMAGE_CHARS: usize = 5 * 1024 * 1024;

/// Prefix identifying an inline image payload rather than a URL
pub const EMBEDDED_IMAGE_PREFIX: &str = "data:image";

/// Generator for placeholder artwork, seeded by asset id or name
pub const PLACEHOLDER_IMAGE_BASE_URL: &str = "https://api.dicebear.com/7.x/shapes/svg?seed=";

/// Remote table carrying the asset rows
pub const ASSETS_TABLE: &str = "assets";

/// Lookback window of the monthly performance figure, in calendar months
pub const MONTHLY_LOOKBACK_MONTHS: u32 = 1;

/// Minimum asset name length, after trimming
pub const MIN_ASSET_NAME_LEN: usize = 2;

/// Prefix of provisional ids given to optimistically added assets
pub const PROVISIONAL_ID_PREFIX: &str = "pending-";
