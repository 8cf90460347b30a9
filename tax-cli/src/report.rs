//! Line-by-line form guidance rendered from a [`TaxResult`].

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tax_core::TaxResult;

/// One labelled amount on the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// Form line reference, blank when the amount has no single line.
    pub line: &'static str,
    pub label: &'static str,
    pub value: LineValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineValue {
    Amount(Decimal),
    Rate(Decimal),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

impl ReportSection {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    fn amount(
        mut self,
        line: &'static str,
        label: &'static str,
        value: Decimal,
    ) -> Self {
        self.lines.push(ReportLine {
            line,
            label,
            value: LineValue::Amount(value),
        });
        self
    }

    /// Adds the line only when the amount is nonzero.
    fn optional(
        self,
        line: &'static str,
        label: &'static str,
        value: Decimal,
    ) -> Self {
        if value.is_zero() {
            self
        } else {
            self.amount(line, label, value)
        }
    }

    fn rate(
        mut self,
        label: &'static str,
        value: Decimal,
    ) -> Self {
        self.lines.push(ReportLine {
            line: "",
            label,
            value: LineValue::Rate(value),
        });
        self
    }

    fn flag(
        mut self,
        label: &'static str,
        value: bool,
    ) -> Self {
        self.lines.push(ReportLine {
            line: "",
            label,
            value: LineValue::Flag(value),
        });
        self
    }

    /// Finds a line by label.
    pub fn line(
        &self,
        label: &str,
    ) -> Option<&ReportLine> {
        self.lines.iter().find(|l| l.label == label)
    }
}

/// The complete guidance report for one computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub heading: String,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn from_result(result: &TaxResult) -> Self {
        let heading = format!(
            "Tax year {} estimate ({})",
            result.tax_year,
            result.filing_status.label()
        );

        let income = &result.income;
        let income_section = ReportSection::new("Income")
            .amount("1a", "Wages", income.wages)
            .amount("2a", "Tax-exempt interest", income.tax_exempt_interest)
            .amount("2b", "Taxable interest", income.taxable_interest)
            .amount("3a", "Qualified dividends", income.qualified_dividends)
            .amount("3b", "Ordinary dividends", income.ordinary_dividends)
            .amount("7", "Capital gain or (loss)", income.capital_gain_or_loss)
            .optional("", "Entity income (owner's share)", income.entity.allocated_income)
            .optional("", "Unemployment compensation", income.unemployment_compensation)
            .optional("", "Taxable refunds", income.taxable_refunds)
            .optional("", "Other income", income.other_income)
            .amount("9", "Total income", income.total_income);

        let adjustments = &result.adjustments;
        let adjustment_section = ReportSection::new("Adjustments to income")
            .optional("", "Student loan interest", adjustments.student_loan_interest)
            .optional("", "Retirement contribution", adjustments.retirement_contribution)
            .optional(
                "",
                "Health savings contribution",
                adjustments.health_savings_contribution,
            )
            .optional("", "Qualified tips", adjustments.tips)
            .optional("", "Qualified overtime", adjustments.overtime)
            .optional("", "Vehicle loan interest", adjustments.vehicle_loan_interest)
            .optional("", "Senior bonus deduction", adjustments.senior_bonus)
            .amount("10", "Total adjustments", adjustments.total)
            .amount("11", "Adjusted gross income", result.adjusted_gross_income);

        let deductions = &result.deductions;
        let deduction_section = ReportSection::new("Deductions")
            .optional("", "Medical expenses above floor", deductions.medical)
            .optional("", "State and local tax (capped)", deductions.state_local_tax)
            .optional("", "Charitable gifts", deductions.charitable)
            .amount("", "Itemized total", deductions.itemized_total)
            .amount("", "Standard deduction", deductions.standard_deduction)
            .flag("Itemizing", deductions.used_itemized)
            .amount("12", "Deduction used", deductions.deduction_used)
            .amount("15", "Taxable income", result.taxable_income)
            .amount("", "Ordinary portion", result.ordinary_taxable_income)
            .amount("", "Preferential portion", result.preferential_income);

        let tax = &result.tax;
        let credits = &result.credits;
        let tax_section = ReportSection::new("Tax and credits")
            .amount("", "Tax on ordinary income", tax.ordinary_tax)
            .amount("", "Tax on preferential income", tax.preferential_tax)
            .amount("16", "Tax", tax.base_tax)
            .optional("", "Net investment income tax", tax.net_investment_income_tax)
            .optional("", "Excess premium credit repayment", tax.premium_credit_repayment)
            .amount("", "Tax before credits", tax.tax_before_credits)
            .optional("", "Dependent care credit", credits.dependent_care)
            .optional("", "Education credit", credits.education)
            .amount("21", "Total credits", credits.nonrefundable_total)
            .amount("22", "Tax after credits", tax.tax_after_credits)
            .optional("", "Additional Medicare tax", tax.additional_medicare_tax)
            .amount("24", "Total tax", tax.total_tax)
            .rate("Marginal rate", tax.marginal_rate)
            .rate("Effective rate", tax.effective_rate);

        let premium = &credits.premium_credit;
        let premium_section = (!premium.advance_payments.is_zero()
            || !premium.allowed_credit.is_zero())
        .then(|| {
            ReportSection::new("Premium tax credit")
                .amount("", "Household income", premium.household_income)
                .amount("", "Poverty line", premium.poverty_line)
                .rate(
                    "Household income / poverty line",
                    premium.poverty_line_percent / dec!(100),
                )
                .rate("Applicable contribution rate", premium.applicable_contribution_rate)
                .amount("", "Annual contribution", premium.annual_contribution)
                .amount("", "Maximum credit", premium.max_credit)
                .amount("", "Allowed credit", premium.allowed_credit)
                .amount("", "Advance payments", premium.advance_payments)
                .amount("", "Net credit", premium.net_credit)
        });

        let payments = &result.payments;
        let payment_section = ReportSection::new("Payments")
            .amount("25", "Federal income tax withheld", payments.withholding)
            .amount("26", "Estimated tax payments", payments.estimated_payments)
            .optional("", "Excess Social Security withheld", payments.excess_social_security)
            .optional("", "Net premium tax credit", payments.refundable_premium_credit)
            .amount("33", "Total payments", payments.total)
            .amount("34", "Refund", result.balance.refund)
            .amount("37", "Amount you owe", result.balance.owed);

        let state = &result.state;
        let state_section = ReportSection::new(format!("{} return", state.name))
            .amount("", "State taxable income", state.taxable_income)
            .rate("State tax rate", state.rate)
            .amount("", "State tax", state.tax)
            .amount("", "State payments and credits", state.payments)
            .amount("", "State refund", state.balance.refund)
            .amount("", "State amount owed", state.balance.owed);

        let mut sections = vec![
            income_section,
            adjustment_section,
            deduction_section,
            tax_section,
        ];
        sections.extend(premium_section);
        sections.push(payment_section);
        sections.push(state_section);

        Self { heading, sections }
    }

    pub fn section(
        &self,
        title: &str,
    ) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }
}

impl fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.title)?;
            for line in &section.lines {
                writeln!(f, "  {:<4} {:<38} {:>16}", line.line, line.label, line.value)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for LineValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            Self::Amount(amount) => format_currency(*amount),
            Self::Rate(rate) => format_percent(*rate),
            Self::Flag(true) => "yes".to_string(),
            Self::Flag(false) => "no".to_string(),
        };
        f.pad(&text)
    }
}

/// Formats an amount as dollars with thousands separators (`-$1,234.50`).
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

/// Formats a fractional rate as a percentage (`0.2200` → `22%`).
pub fn format_percent(rate: Decimal) -> String {
    let percent = (rate * dec!(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{percent}%")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tax_core::{PremiumCreditInputs, TaxCalculator, TaxInputs, TaxParameters};

    use super::*;

    fn report_for(inputs: &TaxInputs) -> Report {
        let params = TaxParameters::tax_year_2025();
        let calculator = TaxCalculator::new(&params).expect("valid parameters");
        Report::from_result(&calculator.compute(inputs))
    }

    fn wages_only(wages: Decimal) -> TaxInputs {
        let mut inputs = TaxInputs::default();
        inputs.income.wages = wages;
        inputs
    }

    // =========================================================================
    // format tests
    // =========================================================================

    #[test]
    fn format_currency_groups_thousands() {
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(100000)), "$100,000.00");
        assert_eq!(format_currency(dec!(999.5)), "$999.50");
    }

    #[test]
    fn format_currency_marks_negative_amounts() {
        assert_eq!(format_currency(dec!(-3000)), "-$3,000.00");
    }

    #[test]
    fn format_currency_zero_has_no_sign() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn format_percent_trims_trailing_zeros() {
        assert_eq!(format_percent(dec!(0.22)), "22%");
        assert_eq!(format_percent(dec!(0.1345)), "13.45%");
        assert_eq!(format_percent(dec!(0.042236)), "4.22%");
    }

    // =========================================================================
    // report tests
    // =========================================================================

    #[test]
    fn report_lists_core_lines_for_wage_earner() {
        let report = report_for(&wages_only(dec!(100000)));

        assert_eq!(report.heading, "Tax year 2025 estimate (Single)");
        let deductions = report.section("Deductions").expect("deduction section");
        assert_eq!(
            deductions.line("Taxable income").map(|l| l.value),
            Some(LineValue::Amount(dec!(84250)))
        );
        let tax = report.section("Tax and credits").expect("tax section");
        assert_eq!(
            tax.line("Total tax").map(|l| l.value),
            Some(LineValue::Amount(dec!(13449.00)))
        );
        assert_eq!(
            tax.line("Marginal rate").map(|l| l.value),
            Some(LineValue::Rate(dec!(0.22)))
        );
    }

    #[test]
    fn report_skips_zero_optional_lines() {
        let report = report_for(&wages_only(dec!(50000)));

        let adjustments = report.section("Adjustments to income").expect("section");
        assert_eq!(adjustments.lines.len(), 2);
        assert!(adjustments.line("Qualified tips").is_none());
        assert!(report.section("Premium tax credit").is_none());
    }

    #[test]
    fn report_includes_premium_credit_when_reconciled() {
        let mut inputs = wages_only(dec!(40000));
        inputs.credits.premium_credit = PremiumCreditInputs {
            family_size: dec!(1),
            enrollment_premium: dec!(9000),
            benchmark_premium: dec!(9500),
            advance_payments: dec!(7000),
        };

        let report = report_for(&inputs);

        let premium = report.section("Premium tax credit").expect("premium section");
        assert_eq!(
            premium.line("Net credit").map(|l| l.value),
            Some(LineValue::Amount(dec!(810.54)))
        );
    }

    #[test]
    fn report_names_state_section() {
        let report = report_for(&wages_only(dec!(100000)));

        let state = report.section("Colorado return").expect("state section");
        assert_eq!(
            state.line("State tax").map(|l| l.value),
            Some(LineValue::Amount(dec!(3707.00)))
        );
    }

    #[test]
    fn rendered_report_aligns_amounts() {
        let report = report_for(&wages_only(dec!(100000)));

        let text = report.to_string();

        assert!(text.starts_with("Tax year 2025 estimate (Single)\n"));
        assert!(text.contains("\nIncome\n"));
        let wages_line = text
            .lines()
            .find(|l| l.contains("Wages"))
            .expect("wages line");
        assert!(wages_line.trim_start().starts_with("1a"));
        assert!(wages_line.ends_with("$100,000.00"));
    }
}
