// ============================================================================
// Execution Outcome Domain Model
// The one-per-command result record produced by the matching engine
// ============================================================================

use rust_decimal::Decimal;

use super::{MarketOrderCommand, StandingOrder};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Account reported when a frame could not be decoded into a command.
pub const UNKNOWN_ACCOUNT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum ExecutionStatus {
    Filled,
    Rejected,
}

/// Terminal result of one command.
///
/// Price and executed quantity are present if and only if the status is
/// `Filled`. Fields are private so that rule cannot be broken after
/// construction, and decoding an outcome re-checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "wire::ExecutionReport", try_from = "wire::ExecutionReport")
)]
pub struct ExecutionOutcome {
    initial_quantity: u64,
    executed_price: Option<Decimal>,
    executed_quantity: Option<u64>,
    account_id: String,
    status: ExecutionStatus,
}

impl ExecutionOutcome {
    /// Build the outcome for `command` given the standing order it consumed, if any.
    pub fn resolve(command: &MarketOrderCommand, matched: Option<&StandingOrder>) -> Self {
        match matched {
            Some(order) => Self::filled(command, order.price),
            None => Self::rejected(command),
        }
    }

    pub fn filled(command: &MarketOrderCommand, price: Decimal) -> Self {
        Self {
            initial_quantity: command.quantity,
            executed_price: Some(price),
            executed_quantity: Some(command.quantity),
            account_id: command.account_id.clone(),
            status: ExecutionStatus::Filled,
        }
    }

    pub fn rejected(command: &MarketOrderCommand) -> Self {
        Self {
            initial_quantity: command.quantity,
            executed_price: None,
            executed_quantity: None,
            account_id: command.account_id.clone(),
            status: ExecutionStatus::Rejected,
        }
    }

    /// The reply sent for a frame that never became a command.
    pub fn decode_failure() -> Self {
        Self {
            initial_quantity: 0,
            executed_price: None,
            executed_quantity: None,
            account_id: UNKNOWN_ACCOUNT.to_string(),
            status: ExecutionStatus::Rejected,
        }
    }

    pub fn initial_quantity(&self) -> u64 {
        self.initial_quantity
    }

    pub fn executed_price(&self) -> Option<Decimal> {
        self.executed_price
    }

    pub fn executed_quantity(&self) -> Option<u64> {
        self.executed_quantity
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_filled(&self) -> bool {
        self.status == ExecutionStatus::Filled
    }
}

#[cfg(feature = "serde")]
mod wire {
    use super::{ExecutionOutcome, ExecutionStatus};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};

    /// The only accepted value of the `type` field
    #[derive(Serialize, Deserialize)]
    enum ReportType {
        #[serde(rename = "exe_report")]
        ExeReport,
    }

    /// `{"type":"exe_report", ...}`; absent price/quantity are omitted.
    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ExecutionReport {
        r#type: ReportType,
        initial_quantity: u64,
        #[serde(
            default,
            with = "rust_decimal::serde::float_option",
            skip_serializing_if = "Option::is_none"
        )]
        executed_price: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        executed_quantity: Option<u64>,
        account_id: String,
        status: ExecutionStatus,
    }

    impl From<ExecutionOutcome> for ExecutionReport {
        fn from(outcome: ExecutionOutcome) -> Self {
            Self {
                r#type: ReportType::ExeReport,
                initial_quantity: outcome.initial_quantity,
                executed_price: outcome.executed_price,
                executed_quantity: outcome.executed_quantity,
                account_id: outcome.account_id,
                status: outcome.status,
            }
        }
    }

    impl TryFrom<ExecutionReport> for ExecutionOutcome {
        type Error = String;

        fn try_from(report: ExecutionReport) -> Result<Self, Self::Error> {
            let filled = report.status == ExecutionStatus::Filled;
            let has_fill = report.executed_price.is_some() && report.executed_quantity.is_some();
            let has_any = report.executed_price.is_some() || report.executed_quantity.is_some();

            if filled != has_fill || (!filled && has_any) {
                return Err(format!(
                    "{:?} report must carry executed price and quantity iff FILLED",
                    report.status
                ));
            }

            Ok(Self {
                initial_quantity: report.initial_quantity,
                executed_price: report.executed_price,
                executed_quantity: report.executed_quantity,
                account_id: report.account_id,
                status: report.status,
            })
        }
    }
}
