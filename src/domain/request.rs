use super::money::{Distance, Money};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// What the requester is asking for.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Reimbursement,
    PaymentRequest,
}

impl RequestKind {
    /// Document title.
    pub fn title(&self) -> &'static str {
        match self {
            RequestKind::Reimbursement => "REIMBURSEMENT OF EXPENSES",
            RequestKind::PaymentRequest => "PAYMENT REQUEST",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Reimbursement => "REIMBURSEMENT",
            RequestKind::PaymentRequest => "PAYMENT REQUEST",
        }
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reembolso" | "reimbursement" => Ok(RequestKind::Reimbursement),
            "pagamento" | "payment_request" => Ok(RequestKind::PaymentRequest),
            other => Err(format!("Unknown request kind: '{other}'")),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    Immediate,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Immediate => "immediate",
        }
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Urgency::Normal),
            "imediato" | "immediate" => Ok(Urgency::Immediate),
            other => Err(format!("Unknown urgency level: '{other}'")),
        }
    }
}

/// Expense category of a line item.
///
/// The form submits Portuguese labels; English names are accepted as well.
/// Anything unrecognised is carried through untouched.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub enum Category {
    Other,
    Fuel,
    Toll,
    Meal,
    Parking,
    Maintenance,
    Mail,
    Copy,
    Unloading,
    Custom(String),
}

impl Category {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "outros" | "other" => Category::Other,
            "combustível" | "combustivel" | "fuel" => Category::Fuel,
            "pedágio" | "pedagio" | "toll" => Category::Toll,
            "refeição" | "refeicao" | "meal" => Category::Meal,
            "estacionamento" | "parking" => Category::Parking,
            "manutenção" | "manutencao" | "maintenance" => Category::Maintenance,
            "correio" | "mail" => Category::Mail,
            "cópia" | "copia" | "copy" => Category::Copy,
            "descarga" | "unloading" => Category::Unloading,
            _ => Category::Custom(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Other => "Other",
            Category::Fuel => "Fuel",
            Category::Toll => "Toll",
            Category::Meal => "Meal",
            Category::Parking => "Parking",
            Category::Maintenance => "Maintenance",
            Category::Mail => "Mail",
            Category::Copy => "Copy",
            Category::Unloading => "Unloading",
            Category::Custom(name) => name,
        };
        f.write_str(name)
    }
}

/// General data of one submission.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct RequestRecord {
    pub kind: RequestKind,
    pub requester: String,
    /// Display string, not parsed.
    pub request_date: String,
    pub beneficiary: String,
    pub department: String,
    pub tax_id: String,
    pub bank: Option<String>,
    pub branch: Option<String>,
    pub account: Option<String>,
    pub pix_key: Option<String>,
    pub urgency: Urgency,
    pub payment_date: String,
}

impl RequestRecord {
    /// First whitespace-separated token of the requester's name.
    pub fn requester_first_name(&self) -> &str {
        self.requester.split_whitespace().next().unwrap_or("")
    }
}

/// One expense row. Both amount modes may be populated; they are summed.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct LineItem {
    pub date: String,
    pub detail: String,
    pub category: Category,
    pub amount: Money,
    pub distance: Distance,
    pub rate: Money,
    /// `Some` exactly when the row is billed to a client.
    pub bill_to_client: Option<String>,
    pub distance_amount: Money,
    pub line_total: Money,
}

impl LineItem {
    pub fn new(
        date: String,
        detail: String,
        category: Category,
        amount: Money,
        distance: Distance,
        rate: Money,
        bill_to_client: Option<String>,
    ) -> Self {
        let distance_amount = distance * rate;
        Self {
            date,
            detail,
            category,
            amount,
            distance,
            rate,
            bill_to_client,
            distance_amount,
            line_total: amount + distance_amount,
        }
    }
}

/// Output of the normalizer: the record plus its rows in submission order.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct NormalizedRequest {
    pub record: RequestRecord,
    pub items: Vec<LineItem>,
}

impl NormalizedRequest {
    pub fn grand_total(&self) -> Money {
        grand_total(&self.items)
    }
}

/// Sum of every row's `line_total`.
pub fn grand_total(items: &[LineItem]) -> Money {
    items.iter().map(|item| item.line_total).sum()
}
