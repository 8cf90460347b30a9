//! Versioned tax-law parameters.
//!
//! A [`TaxParameters`] value holds every bracket table, threshold, cap and
//! phase-out range the engine reads. Calculators never embed these figures;
//! swapping the parameter set is how a different tax year is supported.
//!
//! Parameter sets are validated once (see [`TaxParameters::validate`]) before
//! any computation runs, so the per-call engine never has to guard against a
//! malformed table.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filing_status::{ByFilingStatus, FilingStatus};
use super::tax_bracket::{PreferentialBracket, TaxBracket};

/// Subtraction constants are hand-maintained; they must reproduce the
/// cumulative schedule tax to within one cent.
const SUBTRACTION_TOLERANCE: Decimal = dec!(0.01);

/// Number of household sizes with an explicit poverty guideline.
pub const POVERTY_TABLE_SIZE: usize = 8;

/// Errors found while validating a parameter set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxParametersError {
    #[error("{table} bracket table for {status:?} is empty")]
    EmptyBrackets {
        table: &'static str,
        status: FilingStatus,
    },

    #[error("ordinary bracket table for {status:?} must start at 0, starts at {min_income}")]
    BracketsDoNotStartAtZero {
        status: FilingStatus,
        min_income: Decimal,
    },

    #[error("ordinary bracket {index} for {status:?} does not continue from the previous bracket")]
    BracketGap { status: FilingStatus, index: usize },

    #[error("{table} bracket {index} for {status:?} has bounds that do not increase")]
    BracketNotIncreasing {
        table: &'static str,
        status: FilingStatus,
        index: usize,
    },

    #[error("{table} bracket table for {status:?} must end with an unbounded bracket")]
    BracketsNotUnbounded {
        table: &'static str,
        status: FilingStatus,
    },

    #[error(
        "subtraction constant for bracket {index} ({status:?}) is {actual}, expected {expected}"
    )]
    SubtractionMismatch {
        status: FilingStatus,
        index: usize,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("{name} must be between 0 and 1, got {value}")]
    RateOutOfRange { name: String, value: Decimal },

    #[error("{name} must not be negative, got {value}")]
    NegativeAmount { name: String, value: Decimal },

    #[error("phase-out range for {name} must end after it starts ({start}..{end})")]
    InvalidPhaseOut {
        name: String,
        start: Decimal,
        end: Decimal,
    },

    #[error("poverty guideline table must have {expected} entries, got {actual}")]
    PovertyTableSize { expected: usize, actual: usize },

    #[error("contribution band {index} is malformed or does not continue the previous band")]
    InvalidContributionBand { index: usize },

    #[error("dependent care credit tiers must ascend and end with an unbounded tier")]
    InvalidCreditTiers,
}

/// Linear phase-out band over an income measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutRange {
    pub start: Decimal,
    pub end: Decimal,
}

/// Limits for one above-the-line deduction category.
///
/// The claimed amount is capped at `max_amount`, then at
/// `contribution_limit` when the category has one, and finally reduced by
/// `phase_out` when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLimit {
    pub max_amount: Decimal,
    #[serde(default)]
    pub contribution_limit: Option<Decimal>,
    #[serde(default)]
    pub phase_out: Option<PhaseOutRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRules {
    pub student_loan_interest: DeductionLimit,
    pub retirement_contribution: DeductionLimit,
    /// Limited by the annual contribution cap only. Health savings
    /// deductions are not income tested, so the built-in set carries no
    /// `phase_out` and the adjustment passes through unreduced.
    pub health_savings_contribution: DeductionLimit,
    pub tips: DeductionLimit,
    pub overtime: DeductionLimit,
    pub vehicle_loan_interest: DeductionLimit,
    pub senior_bonus: DeductionLimit,
}

impl AdjustmentRules {
    fn named(&self) -> [(&'static str, &DeductionLimit); 7] {
        [
            ("student loan interest", &self.student_loan_interest),
            ("retirement contribution", &self.retirement_contribution),
            ("health savings contribution", &self.health_savings_contribution),
            ("tips", &self.tips),
            ("overtime", &self.overtime),
            ("vehicle loan interest", &self.vehicle_loan_interest),
            ("senior bonus", &self.senior_bonus),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedRules {
    /// Medical expenses are deductible only above this share of AGI.
    pub medical_agi_floor_rate: Decimal,
    /// Ceiling on the state and local tax deduction.
    pub state_local_tax_cap: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurtaxRules {
    pub net_investment_income_rate: Decimal,
    pub net_investment_income_threshold: ByFilingStatus<Decimal>,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: ByFilingStatus<Decimal>,
}

/// AGI tier of the dependent care credit. The last tier has no ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTier {
    pub max_agi: Option<Decimal>,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentCareRules {
    pub expense_limit: Decimal,
    pub tiers: Vec<CreditTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationRules {
    pub rate: Decimal,
    pub max_credit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRules {
    pub dependent_care: DependentCareRules,
    pub education: EducationRules,
}

/// Band of the applicable contribution percentage table, in percent of the
/// poverty line. Rates are fractions (0.02 = 2% of household income).
///
/// The last band has no upper bound and a flat rate (`start_rate ==
/// end_rate`), so the contribution never jumps to full premium at high
/// income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionBand {
    pub lower_percent: Decimal,
    #[serde(default)]
    pub upper_percent: Option<Decimal>,
    pub start_rate: Decimal,
    pub end_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumCreditRules {
    /// Poverty guideline for household sizes 1 through 8.
    pub poverty_guidelines: Vec<Decimal>,
    /// Added per person beyond the last table entry.
    pub additional_person: Decimal,
    pub contribution_bands: Vec<ContributionBand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityRules {
    pub wage_base: Decimal,
    pub employee_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRules {
    pub name: String,
    pub rate: Decimal,
}

/// The complete constants table for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxParameters {
    pub tax_year: i32,
    pub standard_deduction: ByFilingStatus<Decimal>,
    pub brackets: ByFilingStatus<Vec<TaxBracket>>,
    pub preferential_brackets: ByFilingStatus<Vec<PreferentialBracket>>,
    /// Largest net capital loss that may offset other income.
    pub capital_loss_limit: Decimal,
    pub adjustments: AdjustmentRules,
    pub itemized: ItemizedRules,
    pub surtaxes: SurtaxRules,
    pub credits: CreditRules,
    pub premium_credit: PremiumCreditRules,
    pub social_security: SocialSecurityRules,
    pub state: StateRules,
}

fn bracket(
    min_income: Decimal,
    max_income: Option<Decimal>,
    tax_rate: Decimal,
    subtraction: Decimal,
) -> TaxBracket {
    TaxBracket {
        min_income,
        max_income,
        tax_rate,
        subtraction,
    }
}

fn preferential(
    max_income: Option<Decimal>,
    tax_rate: Decimal,
) -> PreferentialBracket {
    PreferentialBracket {
        max_income,
        tax_rate,
    }
}

fn limit(
    max_amount: Decimal,
    contribution_limit: Option<Decimal>,
    phase_out: Option<(Decimal, Decimal)>,
) -> DeductionLimit {
    DeductionLimit {
        max_amount,
        contribution_limit,
        phase_out: phase_out.map(|(start, end)| PhaseOutRange { start, end }),
    }
}

fn band(
    lower_percent: Decimal,
    upper_percent: Option<Decimal>,
    start_rate: Decimal,
    end_rate: Decimal,
) -> ContributionBand {
    ContributionBand {
        lower_percent,
        upper_percent,
        start_rate,
        end_rate,
    }
}

impl TaxParameters {
    /// The built-in 2025 parameter set.
    pub fn tax_year_2025() -> Self {
        Self {
            tax_year: 2025,
            standard_deduction: ByFilingStatus {
                single: dec!(15750),
                head_of_household: dec!(23625),
            },
            brackets: ByFilingStatus {
                single: vec![
                    bracket(dec!(0), Some(dec!(11925)), dec!(0.10), dec!(0)),
                    bracket(dec!(11925), Some(dec!(48475)), dec!(0.12), dec!(238.50)),
                    bracket(dec!(48475), Some(dec!(103350)), dec!(0.22), dec!(5086.00)),
                    bracket(dec!(103350), Some(dec!(197300)), dec!(0.24), dec!(7153.00)),
                    bracket(dec!(197300), Some(dec!(250525)), dec!(0.32), dec!(22937.00)),
                    bracket(dec!(250525), Some(dec!(626350)), dec!(0.35), dec!(30452.75)),
                    bracket(dec!(626350), None, dec!(0.37), dec!(42979.75)),
                ],
                head_of_household: vec![
                    bracket(dec!(0), Some(dec!(17000)), dec!(0.10), dec!(0)),
                    bracket(dec!(17000), Some(dec!(64850)), dec!(0.12), dec!(340.00)),
                    bracket(dec!(64850), Some(dec!(103350)), dec!(0.22), dec!(6825.00)),
                    bracket(dec!(103350), Some(dec!(197300)), dec!(0.24), dec!(8892.00)),
                    bracket(dec!(197300), Some(dec!(250500)), dec!(0.32), dec!(24676.00)),
                    bracket(dec!(250500), Some(dec!(626350)), dec!(0.35), dec!(32191.00)),
                    bracket(dec!(626350), None, dec!(0.37), dec!(44718.00)),
                ],
            },
            preferential_brackets: ByFilingStatus {
                single: vec![
                    preferential(Some(dec!(48350)), dec!(0)),
                    preferential(Some(dec!(533400)), dec!(0.15)),
                    preferential(None, dec!(0.20)),
                ],
                head_of_household: vec![
                    preferential(Some(dec!(64750)), dec!(0)),
                    preferential(Some(dec!(566700)), dec!(0.15)),
                    preferential(None, dec!(0.20)),
                ],
            },
            capital_loss_limit: dec!(3000),
            adjustments: AdjustmentRules {
                student_loan_interest: limit(
                    dec!(2500),
                    None,
                    Some((dec!(85000), dec!(100000))),
                ),
                retirement_contribution: limit(
                    dec!(7000),
                    Some(dec!(7000)),
                    Some((dec!(79000), dec!(89000))),
                ),
                health_savings_contribution: limit(dec!(4300), Some(dec!(4300)), None),
                tips: limit(dec!(25000), None, Some((dec!(150000), dec!(400000)))),
                overtime: limit(dec!(12500), None, Some((dec!(150000), dec!(275000)))),
                vehicle_loan_interest: limit(
                    dec!(10000),
                    None,
                    Some((dec!(100000), dec!(150000))),
                ),
                senior_bonus: limit(dec!(6000), None, Some((dec!(75000), dec!(175000)))),
            },
            itemized: ItemizedRules {
                medical_agi_floor_rate: dec!(0.075),
                state_local_tax_cap: dec!(40000),
            },
            surtaxes: SurtaxRules {
                net_investment_income_rate: dec!(0.038),
                net_investment_income_threshold: ByFilingStatus {
                    single: dec!(200000),
                    head_of_household: dec!(200000),
                },
                additional_medicare_rate: dec!(0.009),
                additional_medicare_threshold: ByFilingStatus {
                    single: dec!(200000),
                    head_of_household: dec!(200000),
                },
            },
            credits: CreditRules {
                dependent_care: DependentCareRules {
                    expense_limit: dec!(3000),
                    tiers: vec![
                        CreditTier {
                            max_agi: Some(dec!(15000)),
                            rate: dec!(0.35),
                        },
                        CreditTier {
                            max_agi: Some(dec!(25000)),
                            rate: dec!(0.30),
                        },
                        CreditTier {
                            max_agi: Some(dec!(43000)),
                            rate: dec!(0.25),
                        },
                        CreditTier {
                            max_agi: None,
                            rate: dec!(0.20),
                        },
                    ],
                },
                education: EducationRules {
                    rate: dec!(0.20),
                    max_credit: dec!(2000),
                },
            },
            premium_credit: PremiumCreditRules {
                poverty_guidelines: vec![
                    dec!(15650),
                    dec!(21150),
                    dec!(26650),
                    dec!(32150),
                    dec!(37650),
                    dec!(43150),
                    dec!(48650),
                    dec!(54150),
                ],
                additional_person: dec!(5500),
                contribution_bands: vec![
                    band(dec!(100), Some(dec!(133)), dec!(0), dec!(0)),
                    band(dec!(133), Some(dec!(150)), dec!(0), dec!(0)),
                    band(dec!(150), Some(dec!(200)), dec!(0), dec!(0.02)),
                    band(dec!(200), Some(dec!(250)), dec!(0.02), dec!(0.04)),
                    band(dec!(250), Some(dec!(300)), dec!(0.04), dec!(0.06)),
                    band(dec!(300), None, dec!(0.085), dec!(0.085)),
                ],
            },
            social_security: SocialSecurityRules {
                wage_base: dec!(176100),
                employee_rate: dec!(0.062),
            },
            state: StateRules {
                name: "Colorado".to_string(),
                rate: dec!(0.044),
            },
        }
    }

    /// Checks every structural invariant of the parameter set.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxParametersError`] found.
    pub fn validate(&self) -> Result<(), TaxParametersError> {
        for (status, amount) in self.standard_deduction.iter() {
            non_negative(&format!("standard deduction ({status:?})"), *amount)?;
        }
        for (status, brackets) in self.brackets.iter() {
            validate_ordinary_brackets(status, brackets)?;
        }
        for (status, brackets) in self.preferential_brackets.iter() {
            validate_preferential_brackets(status, brackets)?;
        }
        non_negative("capital loss limit", self.capital_loss_limit)?;

        for (name, rule) in self.adjustments.named() {
            non_negative(&format!("{name} maximum"), rule.max_amount)?;
            if let Some(contribution_limit) = rule.contribution_limit {
                non_negative(&format!("{name} contribution limit"), contribution_limit)?;
            }
            if let Some(range) = &rule.phase_out {
                phase_out_range(name, range)?;
            }
        }

        rate("medical AGI floor rate", self.itemized.medical_agi_floor_rate)?;
        non_negative("state and local tax cap", self.itemized.state_local_tax_cap)?;

        rate(
            "net investment income tax rate",
            self.surtaxes.net_investment_income_rate,
        )?;
        rate(
            "additional Medicare tax rate",
            self.surtaxes.additional_medicare_rate,
        )?;

        self.validate_credit_rules()?;
        self.validate_premium_credit_rules()?;

        non_negative("Social Security wage base", self.social_security.wage_base)?;
        rate("Social Security rate", self.social_security.employee_rate)?;
        rate("state tax rate", self.state.rate)?;

        Ok(())
    }

    fn validate_credit_rules(&self) -> Result<(), TaxParametersError> {
        let dependent_care = &self.credits.dependent_care;
        non_negative("dependent care expense limit", dependent_care.expense_limit)?;

        let Some(last) = dependent_care.tiers.last() else {
            return Err(TaxParametersError::InvalidCreditTiers);
        };
        if last.max_agi.is_some() {
            return Err(TaxParametersError::InvalidCreditTiers);
        }
        let bounded = &dependent_care.tiers[..dependent_care.tiers.len() - 1];
        let mut previous: Option<Decimal> = None;
        for tier in bounded {
            let Some(max_agi) = tier.max_agi else {
                return Err(TaxParametersError::InvalidCreditTiers);
            };
            if previous.is_some_and(|prev| max_agi <= prev) {
                return Err(TaxParametersError::InvalidCreditTiers);
            }
            previous = Some(max_agi);
        }
        for tier in &dependent_care.tiers {
            rate("dependent care credit rate", tier.rate)?;
        }

        rate("education credit rate", self.credits.education.rate)?;
        non_negative("education credit maximum", self.credits.education.max_credit)?;
        Ok(())
    }

    fn validate_premium_credit_rules(&self) -> Result<(), TaxParametersError> {
        let rules = &self.premium_credit;
        if rules.poverty_guidelines.len() != POVERTY_TABLE_SIZE {
            return Err(TaxParametersError::PovertyTableSize {
                expected: POVERTY_TABLE_SIZE,
                actual: rules.poverty_guidelines.len(),
            });
        }
        for amount in &rules.poverty_guidelines {
            non_negative("poverty guideline", *amount)?;
        }
        non_negative("poverty guideline increment", rules.additional_person)?;

        if rules.contribution_bands.is_empty() {
            return Err(TaxParametersError::InvalidContributionBand { index: 0 });
        }
        let last_index = rules.contribution_bands.len() - 1;
        let mut previous_upper: Option<Decimal> = None;
        for (index, band) in rules.contribution_bands.iter().enumerate() {
            let bounds_ok = match band.upper_percent {
                Some(upper) => index != last_index && upper > band.lower_percent,
                None => index == last_index && band.start_rate == band.end_rate,
            };
            let malformed = !bounds_ok
                || band.start_rate < Decimal::ZERO
                || band.end_rate > Decimal::ONE
                || band.end_rate < band.start_rate
                || previous_upper.is_some_and(|upper| upper != band.lower_percent);
            if malformed {
                return Err(TaxParametersError::InvalidContributionBand { index });
            }
            previous_upper = band.upper_percent;
        }
        Ok(())
    }
}

fn non_negative(
    name: &str,
    value: Decimal,
) -> Result<(), TaxParametersError> {
    if value < Decimal::ZERO {
        return Err(TaxParametersError::NegativeAmount {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

fn rate(
    name: &str,
    value: Decimal,
) -> Result<(), TaxParametersError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(TaxParametersError::RateOutOfRange {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

fn phase_out_range(
    name: &str,
    range: &PhaseOutRange,
) -> Result<(), TaxParametersError> {
    if range.end <= range.start {
        return Err(TaxParametersError::InvalidPhaseOut {
            name: name.to_string(),
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}

fn validate_ordinary_brackets(
    status: FilingStatus,
    brackets: &[TaxBracket],
) -> Result<(), TaxParametersError> {
    const TABLE: &str = "ordinary";

    let Some(first) = brackets.first() else {
        return Err(TaxParametersError::EmptyBrackets {
            table: TABLE,
            status,
        });
    };
    if first.min_income != Decimal::ZERO {
        return Err(TaxParametersError::BracketsDoNotStartAtZero {
            status,
            min_income: first.min_income,
        });
    }

    let mut cumulative_tax = Decimal::ZERO;
    for (index, bracket) in brackets.iter().enumerate() {
        rate(&format!("bracket {index} rate ({status:?})"), bracket.tax_rate)?;

        let is_last = index + 1 == brackets.len();
        match bracket.max_income {
            Some(max) if max <= bracket.min_income => {
                return Err(TaxParametersError::BracketNotIncreasing {
                    table: TABLE,
                    status,
                    index,
                });
            }
            Some(_) if is_last => {
                return Err(TaxParametersError::BracketsNotUnbounded {
                    table: TABLE,
                    status,
                });
            }
            None if !is_last => {
                return Err(TaxParametersError::BracketGap {
                    status,
                    index: index + 1,
                });
            }
            _ => {}
        }

        if index > 0 && brackets[index - 1].max_income != Some(bracket.min_income) {
            return Err(TaxParametersError::BracketGap { status, index });
        }

        let expected = bracket.tax_rate * bracket.min_income - cumulative_tax;
        if (expected - bracket.subtraction).abs() > SUBTRACTION_TOLERANCE {
            return Err(TaxParametersError::SubtractionMismatch {
                status,
                index,
                expected,
                actual: bracket.subtraction,
            });
        }

        if let Some(max) = bracket.max_income {
            cumulative_tax += (max - bracket.min_income) * bracket.tax_rate;
        }
    }
    Ok(())
}

fn validate_preferential_brackets(
    status: FilingStatus,
    brackets: &[PreferentialBracket],
) -> Result<(), TaxParametersError> {
    const TABLE: &str = "preferential";

    let Some(last) = brackets.last() else {
        return Err(TaxParametersError::EmptyBrackets {
            table: TABLE,
            status,
        });
    };
    if last.max_income.is_some() {
        return Err(TaxParametersError::BracketsNotUnbounded {
            table: TABLE,
            status,
        });
    }

    let mut previous = Decimal::ZERO;
    for (index, bracket) in brackets.iter().enumerate() {
        rate(
            &format!("preferential bracket {index} rate ({status:?})"),
            bracket.tax_rate,
        )?;
        match bracket.max_income {
            Some(max) if max <= previous => {
                return Err(TaxParametersError::BracketNotIncreasing {
                    table: TABLE,
                    status,
                    index,
                });
            }
            Some(max) => previous = max,
            None if index + 1 != brackets.len() => {
                return Err(TaxParametersError::BracketsNotUnbounded {
                    table: TABLE,
                    status,
                });
            }
            None => {}
        }
    }
    Ok(())
}
