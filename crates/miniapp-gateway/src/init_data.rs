//! Telegram Mini App `initData` verification.
//!
//! The Mini App receives a form-encoded context string signed by Telegram.
//! The signature is an HMAC-SHA256 over the sorted `key=value` lines of every
//! field except `hash`, keyed by `HMAC_SHA256("WebAppData", bot_token)`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Key used to derive the per-bot secret.
const WEB_APP_DATA: &[u8] = b"WebAppData";

/// initData verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitDataError {
    #[error("initData is missing")]
    Missing,

    #[error("initData has no hash field")]
    MissingHash,

    #[error("initData hash does not match")]
    Mismatch,
}

/// Parsed initData: ordered fields plus the first `hash` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitData {
    fields: Vec<(String, String)>,
    hash: Option<String>,
}

impl InitData {
    /// Parse a form-encoded initData string.
    ///
    /// Every `hash` pair is removed from the fields; the first one is kept
    /// as the signature.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut fields = Vec::new();
        let mut hash = None;

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if key == "hash" {
                hash.get_or_insert_with(|| value.into_owned());
            } else {
                fields.push((key.into_owned(), value.into_owned()));
            }
        }

        Self { fields, hash }
    }

    /// The signature carried by the payload.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// First value of a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Fields sorted by key (stable) and joined as `key=value` lines.
    pub fn data_check_string(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.fields.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn signer(bot_token: &str, data_check_string: &str) -> HmacSha256 {
    let mut secret =
        HmacSha256::new_from_slice(WEB_APP_DATA).expect("HMAC can take key of any size");
    secret.update(bot_token.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac =
        HmacSha256::new_from_slice(&secret_key).expect("HMAC can take key of any size");
    mac.update(data_check_string.as_bytes());
    mac
}

/// Lowercase hex signature of a data-check string.
pub fn compute_hash(data_check_string: &str, bot_token: &SecretString) -> String {
    let mac = signer(bot_token.expose_secret(), data_check_string);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a raw initData string against the bot token.
///
/// Equivalent to comparing the lowercase hex digest with `hash`; the
/// digest comparison itself runs in constant time.
pub fn verify_init_data(
    raw: Option<&str>,
    bot_token: &SecretString,
) -> Result<InitData, InitDataError> {
    let raw = raw.filter(|r| !r.is_empty()).ok_or(InitDataError::Missing)?;
    let init_data = InitData::parse(raw);
    let received = init_data.hash().ok_or(InitDataError::MissingHash)?;

    let well_formed = received.len() == 64
        && received
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !well_formed {
        return Err(InitDataError::Mismatch);
    }
    let expected = hex::decode(received).map_err(|_| InitDataError::Mismatch)?;

    signer(bot_token.expose_secret(), &init_data.data_check_string())
        .verify_slice(&expected)
        .map_err(|_| InitDataError::Mismatch)?;

    Ok(init_data)
}

/// Build a signed initData string from fields, appending `hash`.
///
/// Useful for minting test payloads for a given bot.
pub fn sign_init_data(fields: &[(&str, &str)], bot_token: &SecretString) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(fields.iter().copied());
    let unsigned = serializer.finish();

    let hash = compute_hash(&InitData::parse(&unsigned).data_check_string(), bot_token);

    let mut serializer = form_urlencoded::Serializer::new(unsigned);
    serializer.append_pair("hash", &hash);
    serializer.finish()
}
