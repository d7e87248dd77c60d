//! AWS Lambda handler for loan calculations
//!
//! Accepts the loan fields as JSON and returns the solved terms, summary and
//! amortization schedule. Fields may be sent as numbers or as user-entered
//! text ("25,00,000").
//!
//! Supports Lambda Function URLs and API Gateway HTTP APIs (payload v2).

use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use loan_amortization::amortization::{calculate, calculate_with};
use loan_amortization::{
    Calculation, CalculatorConfig, LoanField, LoanInputs, RatePoint, ScenarioRunner, SolveFor, Unresolvable,
    YearMonth,
};
use serde::{Deserialize, Serialize};

/// A loan field as sent by the client
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn as_text(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// Input for one calculation
#[derive(Debug, Default, Deserialize)]
pub struct LoanRequest {
    #[serde(default, alias = "loan_amount")]
    pub principal: Option<FieldValue>,

    #[serde(default, alias = "rate")]
    pub annual_rate_percent: Option<FieldValue>,

    #[serde(default)]
    pub tenure_months: Option<FieldValue>,

    /// Used when `tenure_months` is absent
    #[serde(default)]
    pub tenure_years: Option<FieldValue>,

    #[serde(default, alias = "emi")]
    pub installment: Option<FieldValue>,

    /// Field the user edited last; ignored when `solve_for` is given
    #[serde(default)]
    pub last_edited: Option<LoanField>,

    #[serde(default)]
    pub solve_for: Option<SolveFor>,

    /// First repayment month (default: LOAN_START_PERIOD or the current month)
    #[serde(default)]
    pub start_period: Option<YearMonth>,

    /// Omit the schedule rows from the response (default: include)
    #[serde(default)]
    pub summary_only: bool,

    /// Annual rates to compare the solved loan against
    #[serde(default)]
    pub sensitivity_rates: Option<Vec<f64>>,
}

impl LoanRequest {
    fn inputs(&self) -> LoanInputs {
        let text = |value: &Option<FieldValue>| value.as_ref().map(FieldValue::as_text).unwrap_or_default();

        let inputs = LoanInputs::parse(
            &text(&self.principal),
            &text(&self.annual_rate_percent),
            &text(&self.tenure_months),
            &text(&self.installment),
        );

        match (&self.tenure_months, &self.tenure_years) {
            (None, Some(years)) => inputs.with_tenure_years(&years.as_text()),
            _ => inputs,
        }
    }

    fn calculate(&self, config: &CalculatorConfig) -> Result<Calculation, Unresolvable> {
        let inputs = self.inputs();
        let start = self.start_period.unwrap_or(config.start_period);
        match self.solve_for {
            Some(mode) => calculate_with(&inputs, mode, start),
            None => calculate(&inputs, self.last_edited, start),
        }
    }
}

/// Output from a successful calculation
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    #[serde(flatten)]
    pub calculation: Calculation,
    pub tenure_years: f64,
    pub end_period_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_sensitivity: Option<Vec<RatePoint>>,
    pub execution_time_ms: u64,
}

fn json_response(status: i64, body: String) -> ApiGatewayV2httpResponse {
    ApiGatewayV2httpResponse {
        status_code: status,
        body: Some(Body::Text(body)),
        ..Default::default()
    }
}

fn error_response(status: i64, message: &str) -> ApiGatewayV2httpResponse {
    json_response(status, serde_json::json!({ "error": message }).to_string())
}

fn handle(request: ApiGatewayV2httpRequest, config: &CalculatorConfig) -> Result<ApiGatewayV2httpResponse, Error> {
    let start = std::time::Instant::now();

    // CORS preflight; allowed origins are configured on the function URL
    if request.request_context.http.method.as_str() == "OPTIONS" {
        return Ok(ApiGatewayV2httpResponse {
            status_code: 200,
            ..Default::default()
        });
    }

    if request.is_base64_encoded {
        return Ok(error_response(400, "binary request bodies are not supported"));
    }

    let body = request.body.unwrap_or_else(|| "{}".to_string());
    let loan: LoanRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => return Ok(error_response(400, &format!("Invalid JSON: {}", e))),
    };

    let mut calculation = match loan.calculate(config) {
        Ok(c) => c,
        Err(e) => {
            log::info!("Unresolvable loan request: {}", e);
            return Ok(error_response(422, &e.to_string()));
        }
    };

    let rate_sensitivity = loan.sensitivity_rates.as_ref().map(|rates| {
        ScenarioRunner::with_config(config.clone()).rate_sensitivity(
            calculation.terms.principal,
            calculation.terms.tenure_months,
            rates,
        )
    });

    if loan.summary_only {
        calculation.schedule = Default::default();
    }

    let response = LoanResponse {
        tenure_years: calculation.terms.tenure_years(),
        end_period_name: calculation.summary.as_ref().map(|s| s.end_period.long_name()),
        calculation,
        rate_sensitivity,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    Ok(json_response(200, serde_json::to_string(&response)?))
}

/// Lambda handler function
async fn handler(event: LambdaEvent<ApiGatewayV2httpRequest>) -> Result<ApiGatewayV2httpResponse, Error> {
    let config = CalculatorConfig::from_env();
    handle(event.payload, &config)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config() -> CalculatorConfig {
        CalculatorConfig {
            start_period: YearMonth::new(2015, 1).unwrap(),
            ..CalculatorConfig::default()
        }
    }

    fn post(body: &str) -> ApiGatewayV2httpRequest {
        let mut request = ApiGatewayV2httpRequest::default();
        request.request_context.http.method = "POST".parse().unwrap();
        request.body = Some(body.to_string());
        request
    }

    fn body_json(response: &ApiGatewayV2httpResponse) -> serde_json::Value {
        match &response.body {
            Some(Body::Text(text)) => serde_json::from_str(text).unwrap(),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_mixed_number_and_text_fields() {
        let request: LoanRequest = serde_json::from_str(
            r#"{"principal": "25,00,000", "rate": 9.55, "tenure_years": 10, "last_edited": "tenure_years"}"#,
        )
        .unwrap();

        let inputs = request.inputs();
        assert_eq!(inputs.principal, Some(2_500_000.0));
        assert_eq!(inputs.tenure_months, Some(120));

        let calc = request.calculate(&config()).unwrap();
        assert_eq!(calc.solved_for, SolveFor::Installment);
        assert_abs_diff_eq!(calc.terms.installment, 32_417.87, epsilon = 0.01);
    }

    #[test]
    fn test_ok_response() {
        let response = handle(
            post(r#"{"principal": 2500000, "annual_rate_percent": 9.55, "tenure_months": 120, "start_period": "2015-01"}"#),
            &config(),
        )
        .unwrap();

        assert_eq!(response.status_code, 200);
        let json = body_json(&response);
        assert_eq!(json["solved_for"], "installment");
        assert_eq!(json["end_period_name"], "December 2024");
        assert_eq!(json["schedule"]["entries"].as_array().unwrap().len(), 120);
    }

    #[test]
    fn test_rate_sensitivity_field() {
        let response = handle(
            post(r#"{"principal": 2500000, "rate": 9.55, "tenure_months": 120, "summary_only": true, "sensitivity_rates": [8, 9.55, -1]}"#),
            &config(),
        )
        .unwrap();

        let json = body_json(&response);
        assert_eq!(json["schedule"]["entries"].as_array().unwrap().len(), 0);

        let points = json["rate_sensitivity"].as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_abs_diff_eq!(points[1]["installment"].as_f64().unwrap(), 32_417.87, epsilon = 0.01);
    }

    #[test]
    fn test_error_statuses() {
        let bad_json = handle(post("{not json"), &config()).unwrap();
        assert_eq!(bad_json.status_code, 400);

        let never = handle(
            post(r#"{"principal": 100000, "rate": 24, "installment": 100, "solve_for": "tenure"}"#),
            &config(),
        )
        .unwrap();
        assert_eq!(never.status_code, 422);
        assert!(body_json(&never)["error"].as_str().unwrap().contains("never amortizes"));
    }

    #[test]
    fn test_preflight() {
        let mut request = post("");
        request.request_context.http.method = "OPTIONS".parse().unwrap();
        let response = handle(request, &config()).unwrap();
        assert_eq!(response.status_code, 200);
        assert!(response.body.is_none());
    }
}
