use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A currency that transfers may be made in.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "LKR")]
    Lkr,
    #[serde(rename = "AUD")]
    Aud,
    #[serde(rename = "INR")]
    Inr,
}

/// A country that transfers may be sent from or to. Every country uses
/// exactly one [`Currency`], and every currency belongs to exactly one
/// country.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Country {
    #[serde(rename = "USA")]
    Usa,
    #[serde(rename = "Sri Lanka")]
    SriLanka,
    #[serde(rename = "Australia")]
    Australia,
    #[serde(rename = "India")]
    India,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unsupported currency code: {0:?}")]
pub struct UnknownCurrency(pub String);

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unsupported country: {0:?}")]
pub struct UnknownCountry(pub String);

impl Currency {
    pub const ALL: [Currency; 4] = [Self::Usd, Self::Lkr, Self::Aud, Self::Inr];

    /// The ISO 4217 code for the currency.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Lkr => "LKR",
            Self::Aud => "AUD",
            Self::Inr => "INR",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Usd => "US Dollar",
            Self::Lkr => "Sri Lankan Rupee",
            Self::Aud => "Australian Dollar",
            Self::Inr => "Indian Rupee",
        }
    }

    /// The prefix used when displaying an amount in this currency.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Lkr => "Rs.",
            Self::Aud => "A$",
            Self::Inr => "₹",
        }
    }

    /// The country that issues this currency.
    pub fn country(&self) -> Country {
        match self {
            Self::Usd => Country::Usa,
            Self::Lkr => Country::SriLanka,
            Self::Aud => Country::Australia,
            Self::Inr => Country::India,
        }
    }
}

impl Country {
    pub const ALL: [Country; 4] = [Self::Usa, Self::SriLanka, Self::Australia, Self::India];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Usa => "USA",
            Self::SriLanka => "Sri Lanka",
            Self::Australia => "Australia",
            Self::India => "India",
        }
    }

    /// The currency used in this country.
    pub fn currency(&self) -> Currency {
        match self {
            Self::Usa => Currency::Usd,
            Self::SriLanka => Currency::Lkr,
            Self::Australia => Currency::Aud,
            Self::India => Currency::Inr,
        }
    }

    /// Names of every supported country, in display order.
    pub fn supported_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Country::name).collect()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCurrency(s.to_owned()))
    }
}

impl FromStr for Country {
    type Err = UnknownCountry;

    /// Country names must match exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|country| country.name() == s)
            .ok_or_else(|| UnknownCountry(s.to_owned()))
    }
}
