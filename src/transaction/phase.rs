//! Flow phases and the generic stages they map onto.
//!
//! Each flow names its own phases (`minting`, `listing`, ...). Transition
//! rules are defined once, on [`Stage`], so every flow obeys the same
//! lifecycle.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The independent operation families a user can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Mint,
    Redeem,
    Marketplace,
    Holdings,
}

impl FlowKind {
    pub const ALL: [FlowKind; 4] = [
        FlowKind::Mint,
        FlowKind::Redeem,
        FlowKind::Marketplace,
        FlowKind::Holdings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FlowKind::Mint => "mint",
            FlowKind::Redeem => "redeem",
            FlowKind::Marketplace => "marketplace",
            FlowKind::Holdings => "holdings",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flow| flow.as_str() == input)
            .ok_or_else(|| input.to_string())
    }
}

/// Flow-independent lifecycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    PreCheck,
    Setup,
    Submitting,
    Success,
    Error,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Success | Stage::Error)
    }

    /// An operation owns the key while in one of these stages.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Stage::PreCheck | Stage::Setup | Stage::Submitting)
    }

    /// Forward moves only. Leaving a terminal stage goes through reset or a
    /// new start, never through here.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Idle, PreCheck | Setup | Submitting)
                | (PreCheck, Setup | Submitting | Error)
                | (Setup, Submitting | Error)
                | (Submitting, Success | Error)
        )
    }
}

/// A flow's phase enum.
pub trait Phase:
    Copy + Eq + fmt::Debug + Serialize + Send + Sync + 'static
{
    const FLOW: FlowKind;
    const IDLE: Self;
    const SUCCESS: Self;
    const ERROR: Self;

    fn stage(self) -> Stage;

    fn as_str(self) -> &'static str;
}

macro_rules! phase_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $flow:expr, { $($variant:ident => ($label:literal, $stage:ident)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl Phase for $name {
            const FLOW: FlowKind = $flow;
            const IDLE: Self = $name::Idle;
            const SUCCESS: Self = $name::Success;
            const ERROR: Self = $name::Error;

            fn stage(self) -> Stage {
                match self {
                    $($name::$variant => Stage::$stage),+
                }
            }

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(Phase::as_str(*self))
            }
        }
    };
}

phase_enum!(
    /// Minting a new bond.
    MintPhase, FlowKind::Mint, {
        Idle => ("idle", Idle),
        Checking => ("checking", PreCheck),
        Setup => ("setup", Setup),
        Minting => ("minting", Submitting),
        Success => ("success", Success),
        Error => ("error", Error),
    }
);

phase_enum!(
    /// Redeeming a matured bond.
    RedeemPhase, FlowKind::Redeem, {
        Idle => ("idle", Idle),
        Pending => ("pending", Submitting),
        Success => ("success", Success),
        Error => ("error", Error),
    }
);

phase_enum!(
    /// Listing, buying or withdrawing on the marketplace.
    MarketplacePhase, FlowKind::Marketplace, {
        Idle => ("idle", Idle),
        Listing => ("listing", Submitting),
        Purchasing => ("purchasing", Submitting),
        Withdrawing => ("withdrawing", Submitting),
        Success => ("success", Success),
        Error => ("error", Error),
    }
);

phase_enum!(
    /// Reshaping a held bond.
    HoldingsPhase, FlowKind::Holdings, {
        Idle => ("idle", Idle),
        Splitting => ("splitting", Submitting),
        Success => ("success", Success),
        Error => ("error", Error),
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_transitions() {
        assert!(Stage::Idle.can_advance_to(Stage::PreCheck));
        assert!(Stage::PreCheck.can_advance_to(Stage::Setup));
        assert!(Stage::Setup.can_advance_to(Stage::Submitting));
        assert!(Stage::Submitting.can_advance_to(Stage::Success));
        assert!(!Stage::Idle.can_advance_to(Stage::Success));
        assert!(!Stage::Submitting.can_advance_to(Stage::Setup));
        assert!(!Stage::Success.can_advance_to(Stage::Idle));
        assert!(!Stage::Error.can_advance_to(Stage::Submitting));
    }

    #[test]
    fn test_phase_mapping() {
        assert_eq!(MintPhase::Checking.stage(), Stage::PreCheck);
        assert_eq!(MintPhase::Minting.stage(), Stage::Submitting);
        assert_eq!(RedeemPhase::Pending.stage(), Stage::Submitting);
        assert_eq!(MarketplacePhase::Withdrawing.as_str(), "withdrawing");
        assert_eq!(<HoldingsPhase as Phase>::FLOW, FlowKind::Holdings);
        assert_eq!(serde_json::to_string(&MintPhase::Setup).unwrap(), "\"setup\"");
    }

    #[test]
    fn test_flow_kind_parse() {
        assert_eq!("marketplace".parse::<FlowKind>(), Ok(FlowKind::Marketplace));
        assert!("Mint".parse::<FlowKind>().is_err());
    }
}
