//! Leadlovers resources: products, customers, leads, email sequences and tags.
//!
//! Every operation checks its required fields, performs one request and turns
//! any status other than 200 into a [`RestError`].

use crate::error::{RestError, Result};
use crate::params::QueryParam;
use crate::response::{Param, ResponseEnvelope};
use crate::rest::{Leadlovers, RequestSpec};
use crate::transport::Verb;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

const CUSTOMER_REQUIRED: &[(&str, &str)] = &[
    ("Name", "Customer name (Name) is required"),
    ("Email", "Customer e-mail (Email) is required"),
    ("ProductId", "Product ID (ProductId) the customer belongs to is required"),
];

const LEAD_REQUIRED: &[(&str, &str)] = &[
    ("MachineCode", "Machine code (MachineCode) is required"),
    ("Email", "Lead e-mail (Email) is required"),
    ("EmailSequenceCode", "E-mail sequence code (EmailSequenceCode) is required"),
    ("SequenceLevelCode", "E-mail sequence level code (SequenceLevelCode) is required"),
];

const LEAD_UPDATE_REQUIRED: &[(&str, &str)] = &[("Email", "Lead e-mail (Email) is required")];

const TAG_REQUIRED: &[(&str, &str)] = &[
    ("Email", "Lead e-mail (Email) is required"),
    ("Tag", "Tag ID (Tag) is required"),
];

impl Leadlovers {
    /// List the account's products
    #[instrument(skip(self, params))]
    pub fn list_products(&self, params: Vec<QueryParam>) -> Result<ResponseEnvelope> {
        let spec = RequestSpec::new(Verb::Get, "products").query(params);
        check(self.execute(spec), false)
    }

    /// Register a customer under a product
    #[instrument(skip_all)]
    pub fn create_customer<T: Serialize>(
        &self,
        data: &T,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let fields = to_fields(data)?;
        require(&fields, CUSTOMER_REQUIRED)?;

        let spec = RequestSpec::new(Verb::Post, "customer")
            .body(fields)
            .query(params);
        check(self.execute(spec), true)
    }

    /// Look a lead up by e-mail
    #[instrument(skip(self, params))]
    pub fn get_lead_by_email(
        &self,
        email: &str,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let spec = RequestSpec::new(Verb::Get, "lead")
            .query(params)
            .reserve("email", email);
        check(self.execute(spec), false)
    }

    /// Insert a new lead into a machine's e-mail sequence
    #[instrument(skip_all)]
    pub fn create_lead<T: Serialize>(
        &self,
        data: &T,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let fields = to_fields(data)?;
        require(&fields, LEAD_REQUIRED)?;

        let spec = RequestSpec::new(Verb::Post, "lead")
            .body(fields)
            .query(params);
        check(self.execute(spec), true)
    }

    /// Update an existing lead, identified by `Email`
    #[instrument(skip_all)]
    pub fn update_lead<T: Serialize>(
        &self,
        data: &T,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let fields = to_fields(data)?;
        require(&fields, LEAD_UPDATE_REQUIRED)?;

        let spec = RequestSpec::new(Verb::Patch, "lead")
            .body(fields)
            .query(params);
        check(self.execute(spec), true)
    }

    /// Update a lead, or insert it when it does not exist yet
    #[instrument(skip_all)]
    pub fn upsert_lead<T: Serialize>(
        &self,
        data: &T,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let fields = to_fields(data)?;
        require(&fields, LEAD_REQUIRED)?;

        let spec = RequestSpec::new(Verb::Put, "lead")
            .body(fields)
            .query(params);
        check(self.execute(spec), true)
    }

    /// Remove a lead from a machine
    #[instrument(skip(self, params))]
    pub fn remove_lead(
        &self,
        machine_code: i64,
        email: &str,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let spec = RequestSpec::new(Verb::Delete, "lead")
            .query(params)
            .reserve("machineCode", machine_code)
            .reserve("email", email);
        check(self.execute(spec), true)
    }

    /// Remove a lead from one funnel (e-mail sequence) of a machine
    #[instrument(skip(self, params))]
    pub fn remove_lead_from_funnel(
        &self,
        machine_code: i64,
        sequence_code: i64,
        email: &str,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let spec = RequestSpec::new(Verb::Delete, "lead/funnel")
            .query(params)
            .reserve("machineCode", machine_code)
            .reserve("sequenceCode", sequence_code)
            .reserve("email", email);
        check(self.execute(spec), true)
    }

    /// List the e-mail sequences of a machine
    #[instrument(skip(self, params))]
    pub fn list_email_sequences(
        &self,
        machine_code: i64,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let spec = RequestSpec::new(Verb::Get, "emailsequences")
            .query(params)
            .reserve("machineCode", machine_code);
        check(self.execute(spec), false)
    }

    /// List the levels of an e-mail sequence
    #[instrument(skip(self, params))]
    pub fn list_sequence_levels(
        &self,
        machine_code: i64,
        sequence_code: i64,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let spec = RequestSpec::new(Verb::Get, "levels")
            .query(params)
            .reserve("machineCode", machine_code)
            .reserve("sequenceCode", sequence_code);
        check(self.execute(spec), false)
    }

    /// Remove a tag from a lead; `data` carries `Email` and `Tag`
    #[instrument(skip_all)]
    pub fn remove_lead_tag<T: Serialize>(
        &self,
        data: &T,
        params: Vec<QueryParam>,
    ) -> Result<ResponseEnvelope> {
        let fields = to_fields(data)?;
        require(&fields, TAG_REQUIRED)?;

        let spec = RequestSpec::new(Verb::Delete, "Tag")
            .query(params)
            .reserve("email", scalar_text(&fields["Email"]))
            .reserve("tag", scalar_text(&fields["Tag"]));
        check(self.execute(spec), true)
    }
}

/// Return the envelope on 200, otherwise the error it describes
fn check(envelope: ResponseEnvelope, with_mensagens: bool) -> Result<ResponseEnvelope> {
    if envelope.is_success() {
        return Ok(envelope);
    }
    Err(RestError::from_envelope(envelope, with_mensagens))
}

/// Serialize operation input into a JSON object
fn to_fields<T: Serialize>(data: &T) -> Result<Param> {
    match serde_json::to_value(data)? {
        Value::Object(fields) => Ok(fields),
        other => Err(RestError::RequestBuild(format!(
            "request data must be a JSON object, got {}",
            other
        ))),
    }
}

/// Collect a message for every required field that is blank
fn require(fields: &Param, required: &[(&str, &str)]) -> Result<()> {
    let messages: Vec<String> = required
        .iter()
        .filter(|(name, _)| is_blank(fields.get(*name)))
        .map(|(_, message)| message.to_string())
        .collect();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(RestError::validation(messages))
    }
}

/// Missing, null, "", "0", 0, false and empty collections all count as blank
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
