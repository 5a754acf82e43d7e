//! Placement fee pricing.
//!
//! All arithmetic is fixed-point so that quotes are reproducible to the cent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::domain::Urgency;

pub const BASE_RATE: Decimal = dec!(0.12);
pub const COMMISSION_CAP_RATE: Decimal = dec!(0.15);
pub const NEUTRAL_AGENCY_RATING: Decimal = dec!(5);

const HIGH_URGENCY_FACTOR: Decimal = dec!(1.02);
const CRITICAL_URGENCY_FACTOR: Decimal = dec!(1.03);
const MIN_PERFORMANCE_MULTIPLIER: Decimal = dec!(0.9);
const MAX_PERFORMANCE_MULTIPLIER: Decimal = dec!(1.1);

/// Itemised commission so callers can show how a fee was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuote {
    pub annual_salary: Decimal,
    pub urgency: Urgency,
    pub rate: Decimal,
    pub performance_multiplier: Decimal,
    pub cap: Decimal,
    pub amount: Decimal,
}

impl CommissionQuote {
    pub fn capped(&self) -> bool {
        self.amount == self.cap
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommissionCalculator;

impl CommissionCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Fee owed for a placement; `agency_rating` defaults to a neutral 5.
    pub fn commission(
        &self,
        annual_salary: Decimal,
        urgency: Urgency,
        agency_rating: Option<Decimal>,
    ) -> Decimal {
        self.quote(annual_salary, urgency, agency_rating).amount
    }

    pub fn quote(
        &self,
        annual_salary: Decimal,
        urgency: Urgency,
        agency_rating: Option<Decimal>,
    ) -> CommissionQuote {
        let rate = urgency_rate(urgency);
        let performance_multiplier =
            performance_multiplier(agency_rating.unwrap_or(NEUTRAL_AGENCY_RATING));
        let cap = annual_salary * COMMISSION_CAP_RATE;
        let raw = annual_salary * rate * performance_multiplier;

        CommissionQuote {
            annual_salary,
            urgency,
            rate,
            performance_multiplier,
            cap,
            amount: raw.min(cap),
        }
    }
}

fn urgency_rate(urgency: Urgency) -> Decimal {
    match urgency {
        Urgency::Normal => BASE_RATE,
        Urgency::High => BASE_RATE * HIGH_URGENCY_FACTOR,
        Urgency::Critical => BASE_RATE * CRITICAL_URGENCY_FACTOR,
    }
}

fn performance_multiplier(agency_rating: Decimal) -> Decimal {
    (agency_rating / NEUTRAL_AGENCY_RATING)
        .clamp(MIN_PERFORMANCE_MULTIPLIER, MAX_PERFORMANCE_MULTIPLIER)
}
