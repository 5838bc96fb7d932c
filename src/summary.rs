//! Invoice Summary
//!
//! Groups a selection into invoice lines and derives VAT totals. The solver always
//! works on the VAT-exclusive (net) amount; a gross target is converted first with
//! [`target_from_gross`].

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    catalog::ItemId,
    quantize::{dequantize, quantize, quantize_money},
    selection::Selection,
};

/// Errors building or printing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The VAT rate would make the divisor zero or negative.
    #[error("invalid VAT rate {0}")]
    InvalidVatRate(Decimal),

    /// A VAT calculation does not fit in a decimal.
    #[error("VAT calculation overflowed")]
    Overflow,

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Net amount whose gross value at `vat_rate` is `gross`, rounded to minor units.
///
/// # Errors
///
/// Returns [`SummaryError::InvalidVatRate`] if `vat_rate` is `-1` or below, or
/// [`SummaryError::Overflow`] if the net amount cannot be represented.
pub fn target_from_gross<'a>(
    gross: Money<'a, Currency>,
    vat_rate: Decimal,
) -> Result<Money<'a, Currency>, SummaryError> {
    let divisor = Decimal::ONE + vat_rate;

    if divisor <= Decimal::ZERO {
        return Err(SummaryError::InvalidVatRate(vat_rate));
    }

    let currency = gross.currency();
    let net = gross
        .amount()
        .checked_div(divisor)
        .ok_or(SummaryError::Overflow)?;

    Ok(dequantize(quantize(net, currency.exponent), currency))
}

/// One invoice line: every unit of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine<'a> {
    /// Item id
    pub id: ItemId,

    /// Item name
    pub name: String,

    /// Number of units
    pub quantity: u32,

    /// Price of one unit
    pub unit_price: Money<'a, Currency>,

    /// `quantity × unit_price`
    pub total: Money<'a, Currency>,
}

/// A selection grouped into lines, in the order each item first appears.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<'a> {
    lines: Vec<SummaryLine<'a>>,
    net: Money<'a, Currency>,
}

impl<'a> Summary<'a> {
    /// Group the units of `selection` into lines.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError::Money`] if units are priced in different currencies.
    pub fn from_selection(selection: &Selection<'a>) -> Result<Self, SummaryError> {
        let mut lines: Vec<SummaryLine<'a>> = Vec::new();

        for unit in selection.iter() {
            if let Some(line) = lines.iter_mut().find(|line| line.id == unit.id) {
                line.quantity += 1;
                line.total = line.total.add(unit.unit_price)?;
            } else {
                lines.push(SummaryLine {
                    id: unit.id.clone(),
                    name: unit.name.clone(),
                    quantity: 1,
                    unit_price: unit.unit_price,
                    total: unit.unit_price,
                });
            }
        }

        Ok(Self {
            lines,
            net: selection.total(),
        })
    }

    /// Invoice lines
    pub fn lines(&self) -> &[SummaryLine<'a>] {
        &self.lines
    }

    /// Total before VAT
    pub fn net(&self) -> Money<'a, Currency> {
        self.net
    }

    /// VAT on the net total at `vat_rate`, rounded to minor units.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Overflow`] if the VAT amount cannot be represented.
    pub fn vat(&self, vat_rate: Decimal) -> Result<Money<'a, Currency>, SummaryError> {
        let currency = self.net.currency();
        let vat = self
            .net
            .amount()
            .checked_mul(vat_rate)
            .ok_or(SummaryError::Overflow)?;

        Ok(dequantize(quantize(vat, currency.exponent), currency))
    }

    /// Net plus VAT.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Overflow`] if the VAT or gross amount cannot be
    /// represented in minor units.
    pub fn gross(&self, vat_rate: Decimal) -> Result<Money<'a, Currency>, SummaryError> {
        let currency = self.net.currency();
        let net = quantize_money(&self.net);
        let vat = quantize_money(&self.vat(vat_rate)?);

        let gross = net.checked_add(vat).ok_or(SummaryError::Overflow)?;

        Ok(dequantize(gross, currency))
    }

    /// Print the lines and totals as a table.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::IO`] if writing fails.
    pub fn write_to(
        &self,
        out: &mut impl io::Write,
        vat_rate: Decimal,
    ) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Id", "Item", "Qty", "Unit price", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.id.to_string(),
                line.name.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| SummaryError::IO)?;

        let vat_label = format!("VAT ({}%):", (vat_rate * Decimal::ONE_HUNDRED).normalize());

        for (label, value) in [
            ("Net:", self.net()),
            (vat_label.as_str(), self.vat(vat_rate)?),
            ("Gross:", self.gross(vat_rate)?),
        ] {
            let value = value.to_string();

            writeln!(out, " {label:<14}{value:>14}").map_err(|_err| SummaryError::IO)?;
        }

        Ok(())
    }
}
