use crate::error::PpkError;
use crate::measurement::CalibrationResistors;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

/// Parsed startup handshake, read once from the channel at session
/// start.
///
/// The blob is ASCII text of the form
/// `R1:<f> R2:<f> R3:<f> Board ID <id> [USER SET R1:<f> R2:<f> R3:<f>]
/// Refs HI: <int> LO: <int> VDD: <int>`. The production-calibrated
/// resistances come first; a `USER SET` section, when present,
/// overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handshake {
    pub production_resistors: CalibrationResistors,
    pub user_resistors: Option<CalibrationResistors>,
    pub board_id: String,
    pub vref_hi: i32,
    pub vref_lo: i32,
    pub vdd_mv: u16,
}

impl Handshake {
    /// Parse the handshake blob. A missing `Refs` section or any field
    /// that fails numeric parse is fatal: the device needs reflashing
    /// or the channel is desynchronized, and the session cannot start.
    pub fn parse(blob: &str) -> Result<Self, PpkError> {
        // The channel delivers a fixed-size read, so the text may be
        // padded with NULs.
        let text = blob.trim_matches(['\0', ' ', '\r', '\n']);

        let (production_part, rest) = match text.split_once("USER SET") {
            Some((head, tail)) => (head, Some(tail)),
            None => (text, None),
        };

        let production_resistors = parse_resistors(production_part)?;
        let board_id = token_after(production_part, "Board ID")
            .ok_or_else(|| PpkError::Handshake("missing Board ID".to_string()))?
            .to_string();

        let user_resistors = match rest {
            Some(tail) => {
                let user_part = tail.split("Refs").next().unwrap_or(tail);
                Some(parse_resistors(user_part)?)
            }
            None => None,
        };

        let refs_part = text
            .split_once("Refs ")
            .ok_or_else(|| PpkError::Handshake("missing Refs section".to_string()))?
            .1;
        let vref_hi = field_after(refs_part, "HI:")?;
        let vref_lo = field_after(refs_part, "LO:")?;
        let vdd_mv = field_after(refs_part, "VDD:")?;

        info!(%board_id, "parsed device handshake");

        Ok(Self {
            production_resistors,
            user_resistors,
            board_id,
            vref_hi,
            vref_lo,
            vdd_mv,
        })
    }

    /// Resistances in effect for conversion: the user-set override when
    /// present, the production calibration otherwise.
    pub fn effective_resistors(&self) -> CalibrationResistors {
        self.user_resistors.unwrap_or(self.production_resistors)
    }
}

fn parse_resistors(section: &str) -> Result<CalibrationResistors, PpkError> {
    Ok(CalibrationResistors::new(
        field_after(section, "R1:")?,
        field_after(section, "R2:")?,
        field_after(section, "R3:")?,
    ))
}

/// First whitespace-delimited token after `label`
fn token_after<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.split_once(label)?.1.split_whitespace().next()
}

fn field_after<T: FromStr>(text: &str, label: &str) -> Result<T, PpkError> {
    let token =
        token_after(text, label).ok_or_else(|| PpkError::Handshake(format!("missing {label} field")))?;
    token
        .parse::<T>()
        .map_err(|_| PpkError::Handshake(format!("{label} field {token:?} failed numeric parse")))
}
