use super::CaptureError;
use crate::model::LineAppend;

/// A line as typed into a capture form, before it is checked.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDraft {
    pub code: String,
    pub description: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl LineDraft {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        unit_price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            unit_price,
            quantity,
        }
    }

    /// Builds a draft from raw form text.
    ///
    /// Price must parse as a finite number, zero allowed; quantity as a positive integer.
    pub fn parse(
        code: &str,
        description: &str,
        unit_price: &str,
        quantity: &str,
    ) -> Result<Self, CaptureError> {
        let price: f64 = unit_price
            .trim()
            .parse()
            .map_err(|_| CaptureError::InvalidAmount(format!("unit price {unit_price:?}")))?;
        let quantity: u32 = quantity
            .trim()
            .parse()
            .map_err(|_| CaptureError::InvalidAmount(format!("quantity {quantity:?}")))?;
        let draft = Self::new(code, description, price, quantity);
        draft.check_amounts()?;
        Ok(draft)
    }

    /// Trimmed copy with a blank code replaced by `default_code`.
    pub fn normalized(&self, default_code: &str) -> Result<Self, CaptureError> {
        self.check_amounts()?;
        let description = self.description.trim();
        if description.is_empty() {
            return Err(CaptureError::MissingDescription);
        }
        let code = match self.code.trim() {
            "" => default_code.trim(),
            code => code,
        };
        Ok(Self {
            code: code.to_string(),
            description: description.to_string(),
            unit_price: self.unit_price,
            quantity: self.quantity,
        })
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    /// Regular sales are priced: a zero unit price is refused there.
    pub(crate) fn require_priced(&self) -> Result<(), CaptureError> {
        if self.unit_price > 0.0 {
            return Ok(());
        }
        Err(CaptureError::InvalidAmount(format!(
            "unit price {}",
            self.unit_price
        )))
    }

    pub(crate) fn to_append(&self, reserve_code: bool) -> LineAppend {
        LineAppend {
            code: self.code.clone(),
            description: self.description.clone(),
            unit_price: self.unit_price,
            quantity: self.quantity,
            reserve_code,
        }
    }

    fn check_amounts(&self) -> Result<(), CaptureError> {
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(CaptureError::InvalidAmount(format!(
                "unit price {}",
                self.unit_price
            )));
        }
        if self.quantity == 0 {
            return Err(CaptureError::InvalidAmount("quantity 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_non_numeric_and_negative() {
        for (price, qty) in [("abc", "1"), ("-5", "1"), ("NaN", "1"), ("10", "0"), ("10", "1.5"), ("10", "-1")] {
            let err = LineDraft::parse("JP1", "Red dress", price, qty).unwrap_err();
            assert!(matches!(err, CaptureError::InvalidAmount(_)), "{price} {qty}");
        }
        let draft = LineDraft::parse("JP1", "Red dress", " 15000 ", "2").unwrap();
        assert_eq!(draft.line_total(), 30000.0);
    }

    #[test]
    fn test_zero_price_is_a_gift_but_not_a_sale() {
        let gift = LineDraft::parse("JP9", "Gift", "0", "1").unwrap();
        assert_eq!(gift.line_total(), 0.0);
        assert!(matches!(gift.require_priced(), Err(CaptureError::InvalidAmount(_))));
        assert!(LineDraft::new("JP9", "Bag", 0.5, 1).require_priced().is_ok());
    }

    #[test]
    fn test_normalized_defaults_blank_code_and_trims() {
        let draft = LineDraft::new("  ", "  Red dress ", 10.0, 1)
            .normalized("JP")
            .unwrap();
        assert_eq!(draft.code, "JP");
        assert_eq!(draft.description, "Red dress");

        let kept = LineDraft::new(" jp7 ", "Bag", 10.0, 1).normalized("JP").unwrap();
        assert_eq!(kept.code, "jp7");
    }

    #[test]
    fn test_normalized_requires_description() {
        let err = LineDraft::new("JP1", "   ", 10.0, 1).normalized("JP").unwrap_err();
        assert_eq!(err, CaptureError::MissingDescription);
    }
}
