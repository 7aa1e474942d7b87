// Order model representing delivery orders as received and as planned

use crate::models::{Coordinate, Degrees, Kilograms, Kilometers, Slot};
use serde::{Deserialize, Serialize};

/// A JSON value that may arrive either as text or as a number.
/// Any other JSON type is kept as `Other` and reads as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Scalar {
    /// Trimmed textual form; whole numbers render without a fraction
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Number(value) => value.to_string(),
            Scalar::Text(text) => text.trim().to_string(),
            Scalar::Other(_) => String::new(),
        }
    }

    /// Strict numeric form: `None` for empty, unparseable or non-finite values
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Number(value) => *value,
            Scalar::Text(text) => text.trim().parse::<f64>().ok()?,
            Scalar::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Numeric form accepting both `,` and `.` as decimal separator.
    /// Anything unparseable or non-finite yields zero.
    pub fn to_weight(&self) -> Kilograms {
        let value = match self {
            Scalar::Number(value) => *value,
            Scalar::Text(text) => {
                let text = text.replacen(',', ".", 1);
                let text = text.trim();
                if text.is_empty() {
                    0.0
                } else {
                    text.parse::<f64>().unwrap_or(0.0)
                }
            }
            Scalar::Other(_) => 0.0,
        };

        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

/// Order descriptor as submitted by the caller, accepting both field-name conventions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belegnummer: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kunde: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matchcode: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kundennr: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plz: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ort: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lieferscheindatum: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gewicht: Option<Scalar>,
}

/// Returns the first candidate with a non-empty textual form
fn first_text(candidates: &[&Option<Scalar>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|candidate| candidate.as_ref())
        .map(Scalar::to_text)
        .find(|text| !text.is_empty())
}

impl RawOrder {
    /// Creates a descriptor with the English field names filled in
    pub fn new<S: Into<String>>(id: S, zip: S, weight: Kilograms) -> Self {
        Self {
            id: Some(Scalar::Text(id.into())),
            zip: Some(Scalar::Text(zip.into())),
            weight: Some(Scalar::Number(weight)),
            ..Self::default()
        }
    }

    /// Sets the delivery date
    pub fn with_delivery_date<S: Into<String>>(mut self, date: S) -> Self {
        self.delivery_date = Some(Scalar::Text(date.into()));
        self
    }

    /// Resolves synonyms and defaults into an `Order`.
    /// `position` is the zero-based index within the request.
    pub fn normalize(&self, position: usize) -> Order {
        let number = position + 1;
        let weight = self
            .weight
            .as_ref()
            .or(self.gewicht.as_ref())
            .map(Scalar::to_weight)
            .unwrap_or(0.0);

        Order {
            id: first_text(&[&self.id, &self.belegnummer])
                .unwrap_or_else(|| format!("LS-{:04}", number)),
            customer_name: first_text(&[&self.customer_name, &self.kunde, &self.matchcode])
                .unwrap_or_else(|| format!("Unbenannt {}", number)),
            customer_number: first_text(&[&self.customer_number, &self.kundennr])
                .unwrap_or_default(),
            zip: first_text(&[&self.zip, &self.plz, &self.postcode]).unwrap_or_default(),
            city: first_text(&[&self.city, &self.ort]).unwrap_or_default(),
            delivery_date: first_text(&[&self.delivery_date, &self.lieferscheindatum])
                .unwrap_or_default(),
            weight,
        }
    }
}

/// Normalizes raw descriptors and drops the ones that cannot take part in planning
pub fn normalize_orders(raw_orders: &[RawOrder]) -> Vec<Order> {
    raw_orders
        .iter()
        .enumerate()
        .map(|(position, raw)| raw.normalize(position))
        .filter(Order::is_plannable)
        .collect()
}

/// Represents a delivery order with its public fields only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_number: String,
    pub zip: String,
    pub city: String,
    pub delivery_date: String,
    pub weight: Kilograms,
}

impl Order {
    /// An order takes part in planning only with a postal code and a positive weight
    pub fn is_plannable(&self) -> bool {
        !self.zip.trim().is_empty() && self.weight > 0.0
    }
}

/// An order enriched with the derived data the planner works on
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOrder {
    /// Public order fields, passed through untouched
    pub order: Order,

    /// Position among the normalized orders of the request
    pub node: usize,

    pub coordinate: Coordinate,

    /// Initial great-circle bearing from the depot, in [0, 360)
    pub bearing: Degrees,

    pub distance_from_depot: Kilometers,

    pub slot: Slot,
}

impl PlannedOrder {
    pub fn weight(&self) -> Kilograms {
        self.order.weight
    }

    /// Drops every derived field, leaving the public order
    pub fn into_order(self) -> Order {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_with_comma_separator() {
        assert_eq!(Scalar::Text("12,5".to_string()).to_weight(), 12.5);
        assert_eq!(Scalar::Text(" 7.25 ".to_string()).to_weight(), 7.25);
        assert_eq!(Scalar::Number(300.0).to_weight(), 300.0);
        assert_eq!(Scalar::Text("heavy".to_string()).to_weight(), 0.0);
        assert_eq!(Scalar::Text("".to_string()).to_weight(), 0.0);
    }

    #[test]
    fn test_numeric_zip_renders_without_fraction() {
        assert_eq!(Scalar::Number(33181.0).to_text(), "33181");
    }

    #[test]
    fn test_unexpected_value_types_read_as_missing() {
        let raw_orders: Vec<RawOrder> = serde_json::from_str(
            r#"[{"id": "A", "zip": "33181", "weight": true},
                {"id": {"nr": 1}, "zip": ["33100"], "gewicht": 40},
                {"id": "C", "zip": "59555", "weight": 25}]"#,
        )
        .unwrap();

        let first = raw_orders[0].normalize(0);
        assert_eq!(first.weight, 0.0);
        assert!(!first.is_plannable());

        let second = raw_orders[1].normalize(1);
        assert_eq!(second.id, "LS-0002");
        assert!(second.zip.is_empty());
        assert_eq!(Scalar::Other(serde_json::Value::Bool(true)).as_f64(), None);

        let ids: Vec<String> = normalize_orders(&raw_orders)
            .into_iter()
            .map(|order| order.id)
            .collect();
        assert_eq!(ids, vec!["C"]);
    }

    #[test]
    fn test_german_field_names() {
        let raw: RawOrder = serde_json::from_str(
            r#"{"belegnummer": "B-7", "kunde": "Bäckerei", "kundennr": 4711,
                "plz": " 33100 ", "ort": "Paderborn", "lieferscheindatum": "05.03.2024",
                "gewicht": "120,5"}"#,
        )
        .unwrap();
        let order = raw.normalize(0);

        assert_eq!(order.id, "B-7");
        assert_eq!(order.customer_name, "Bäckerei");
        assert_eq!(order.customer_number, "4711");
        assert_eq!(order.zip, "33100");
        assert_eq!(order.city, "Paderborn");
        assert_eq!(order.delivery_date, "05.03.2024");
        assert_eq!(order.weight, 120.5);
    }

    #[test]
    fn test_defaults_use_position() {
        let order = RawOrder::default().normalize(6);

        assert_eq!(order.id, "LS-0007");
        assert_eq!(order.customer_name, "Unbenannt 7");
        assert!(order.customer_number.is_empty());
        assert!(!order.is_plannable());
    }

    #[test]
    fn test_english_name_wins_over_synonym() {
        let raw: RawOrder =
            serde_json::from_str(r#"{"zip": "", "plz": "59555", "weight": 1}"#).unwrap();
        assert_eq!(raw.normalize(0).zip, "59555");

        let raw: RawOrder =
            serde_json::from_str(r#"{"zip": "33181", "postcode": "59555", "weight": 1}"#).unwrap();
        assert_eq!(raw.normalize(0).zip, "33181");
    }

    #[test]
    fn test_normalize_drops_invalid_orders() {
        let raw_orders = vec![
            RawOrder::new("A", "33181", 100.0),
            RawOrder::new("B", "   ", 100.0),
            RawOrder::new("C", "33100", 0.0),
            RawOrder::new("D", "33100", -5.0),
            RawOrder::new("E", "59555", 0.5),
        ];
        let orders = normalize_orders(&raw_orders);
        let ids: Vec<&str> = orders.iter().map(|order| order.id.as_str()).collect();

        assert_eq!(ids, vec!["A", "E"]);
    }
}
