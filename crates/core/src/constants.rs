/// Campaign status tokens, as stored and serialized.
pub const CAMPAIGN_STATUS_PLANNED: &str = "planejada";
pub const CAMPAIGN_STATUS_ACTIVE: &str = "ativa";
pub const CAMPAIGN_STATUS_CLOSED: &str = "encerrada";
pub const CAMPAIGN_STATUS_CANCELLED: &str = "cancelada";

/// Contribution confirmation tokens. Only `confirmada` is produced today.
pub const CONTRIBUTION_STATUS_CONFIRMED: &str = "confirmada";
pub const CONTRIBUTION_STATUS_PENDING: &str = "pendente";
pub const CONTRIBUTION_STATUS_REVOKED: &str = "revogada";

/// Display name of the bucket that collects anonymous contributions.
pub const ANONYMOUS_DONOR_NAME: &str = "Anonymous Donor";

/// Number of donors reported in campaign statistics.
pub const TOP_DONORS_LIMIT: usize = 10;

/// Default number of campaigns returned by the ranking.
pub const DEFAULT_RANKING_LIMIT: usize = 10;

/// Largest accepted contribution amount or campaign goal.
pub const MAX_MONEY_AMOUNT: i64 = 1_000_000_000_000;

/// Decimal places used for percentages and averages.
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Default IANA time zone used to decide what "today" is.
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
