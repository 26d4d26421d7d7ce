use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use backend_domain::{
    clean_text, decimal_from_f64, decimal_to_count, parse_amount_text, LookupError, MemberProfile,
    ProfileLookup, ProfileTotals,
};

/// Backoffice client lookup over HTTP. The credential is passed per call
/// so that a rotated token takes effect immediately.
pub struct BackofficeClient {
    client: Client,
    api_base: String,
    kpi_enabled: bool,
}

impl BackofficeClient {
    pub fn new(api_base: &str, timeout_seconds: u64, kpi_enabled: bool) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            kpi_enabled,
        })
    }

    async fn get_data(&self, endpoint: &str, member_id: &str, token: &str) -> Result<Value, LookupError> {
        let url = format!("{}/Client/{}", self.api_base, endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("id", member_id)])
            .header("Authentication", token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| LookupError::Transient(err.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(LookupError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound),
            status if !status.is_success() => {
                return Err(LookupError::Transient(format!("{} returned {}", endpoint, status)))
            }
            _ => {}
        }
        response
            .json::<Value>()
            .await
            .map_err(|err| LookupError::Transient(format!("invalid {} response: {}", endpoint, err)))
    }
}

#[async_trait]
impl ProfileLookup for BackofficeClient {
    async fn fetch_profile(
        &self,
        member_id: &str,
        credential: Option<&str>,
    ) -> Result<MemberProfile, LookupError> {
        let token = credential
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(LookupError::MissingCredential)?;

        let body = self.get_data("GetClientById", member_id, token).await?;
        let mut profile = parse_profile(&body)?;
        debug!("profile for {} fetched", member_id);

        if self.kpi_enabled {
            match self.get_data("GetClientKpi", member_id, token).await {
                Ok(kpi) => profile.totals = parse_totals(&kpi),
                Err(err) => warn!("kpi lookup for {} failed: {}", member_id, err),
            }
        }
        Ok(profile)
    }
}

fn data_object(body: &Value) -> Result<&Value, LookupError> {
    if body.get("HasError").and_then(Value::as_bool) == Some(true) {
        let message = body
            .get("AlertMessage")
            .and_then(Value::as_str)
            .unwrap_or("backoffice reported an error");
        return Err(LookupError::Transient(message.to_string()));
    }
    let data = match body.get("Data") {
        Some(Value::Array(items)) => items.first(),
        Some(value @ Value::Object(_)) => Some(value),
        _ => None,
    };
    match data {
        Some(value) if value.as_object().is_some_and(|map| !map.is_empty()) => Ok(value),
        _ => Err(LookupError::NotFound),
    }
}

fn text_field(data: &Value, key: &str) -> Option<String> {
    let text = match data.get(key)? {
        Value::String(text) => clean_text(text),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn decimal_field(data: &Value, key: &str) -> Option<Decimal> {
    match data.get(key)? {
        Value::Number(number) => number
            .as_i64()
            .map(Decimal::from)
            .or_else(|| number.as_f64().and_then(decimal_from_f64)),
        Value::String(text) => parse_amount_text(text),
        _ => None,
    }
}

/// Maps a `GetClientById` body onto a profile.
pub fn parse_profile(body: &Value) -> Result<MemberProfile, LookupError> {
    let data = data_object(body)?;
    let first = text_field(data, "FirstName").unwrap_or_default();
    let last = text_field(data, "LastName").unwrap_or_default();
    Ok(MemberProfile {
        username: text_field(data, "Login").unwrap_or_default(),
        full_name: format!("{} {}", first, last).trim().to_string(),
        email: text_field(data, "Email"),
        phone: text_field(data, "Phone"),
        status: text_field(data, "Status"),
        registration_date: text_field(data, "CreatedLocalDate"),
        last_login_date: text_field(data, "LastLoginLocalDate"),
        last_deposit_date: text_field(data, "LastDepositDateLocal"),
        last_casino_bet: text_field(data, "LastCasinoBetTimeLocal"),
        partner_name: text_field(data, "PartnerName"),
        birth_date: text_field(data, "BirthDate"),
        balance: decimal_field(data, "Balance").unwrap_or_default(),
        currency: text_field(data, "CurrencyId"),
        totals: None,
        raw: data.clone(),
    })
}

/// Maps a `GetClientKpi` body onto lifetime totals; `None` when absent.
pub fn parse_totals(body: &Value) -> Option<ProfileTotals> {
    let data = data_object(body).ok()?;
    let count = |key: &str| {
        decimal_field(data, key)
            .and_then(decimal_to_count)
            .unwrap_or_default()
    };
    let amount = |key: &str| decimal_field(data, key).unwrap_or_default();
    Some(ProfileTotals {
        deposit_count: count("DepositCount"),
        total_deposits: amount("DepositAmount"),
        withdrawal_count: count("WithdrawalCount"),
        total_withdrawals: amount("WithdrawalAmount"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_profile_fields() {
        let body = json!({
            "HasError": false,
            "Data": {
                "Login": "ahmet",
                "FirstName": "Ahmet",
                "LastName": "Yılmaz",
                "Email": "",
                "Phone": 905551234567u64,
                "Balance": 125.75,
                "CurrencyId": "TRY",
                "LastDepositDateLocal": "2025-08-01T10:15:00.123",
                "PartnerName": null
            }
        });
        let profile = parse_profile(&body).expect("profile");
        assert_eq!(profile.username, "ahmet");
        assert_eq!(profile.full_name, "Ahmet Yılmaz");
        assert_eq!(profile.email, None);
        assert_eq!(profile.phone.as_deref(), Some("905551234567"));
        assert_eq!(profile.balance, Decimal::new(12575, 2));
        assert_eq!(profile.partner_name, None);
        assert_eq!(
            profile.last_deposit_date.as_deref(),
            Some("2025-08-01T10:15:00.123")
        );
        assert_eq!(profile.raw["Login"], "ahmet");
    }

    #[test]
    fn takes_first_element_of_array_data() {
        let body = json!({ "Data": [{ "Login": "first" }, { "Login": "second" }] });
        assert_eq!(parse_profile(&body).expect("profile").username, "first");
    }

    #[test]
    fn empty_data_is_not_found() {
        for body in [json!({ "Data": null }), json!({ "Data": [] }), json!({ "Data": {} }), json!({})] {
            assert_eq!(parse_profile(&body), Err(LookupError::NotFound));
        }
    }

    #[test]
    fn backoffice_errors_are_transient() {
        let body = json!({ "HasError": true, "AlertMessage": "Session expired", "Data": null });
        assert_eq!(
            parse_profile(&body),
            Err(LookupError::Transient("Session expired".to_string()))
        );
    }

    #[test]
    fn maps_kpi_totals() {
        let body = json!({
            "Data": {
                "DepositCount": 12,
                "DepositAmount": "1.250,50",
                "WithdrawalCount": 3.0,
                "WithdrawalAmount": 400
            }
        });
        let totals = parse_totals(&body).expect("totals");
        assert_eq!(totals.deposit_count, 12);
        assert_eq!(totals.total_deposits, Decimal::new(125050, 2));
        assert_eq!(totals.withdrawal_count, 3);
        assert_eq!(totals.total_withdrawals, Decimal::from(400));
        assert!(parse_totals(&json!({ "Data": null })).is_none());
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let client = BackofficeClient::new("http://127.0.0.1:9", 1, false).expect("client");
        assert_eq!(
            client.fetch_profile("303364529", Some("  ")).await,
            Err(LookupError::MissingCredential)
        );
    }
}
