use super::{field, when};
use crate::client::GatewayClient;
use crate::output::Output;
use crate::record::{ListPage, Record};
use anyhow::{anyhow, Result};
use serde_json::Value;

pub(super) fn run(gateway: &GatewayClient) -> Result<Output> {
    let page = ListPage::from_value(gateway.me()?)?;
    let me = page
        .results
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Unable to retrieve current user information"))?;
    Ok(render(&me))
}

fn render(me: &Record) -> Output {
    Output::show()
        .field("id", me.id)
        .field("username", field(me, "username"))
        .field("email", field(me, "email"))
        .field("first_name", field(me, "first_name"))
        .field("last_name", field(me, "last_name"))
        .field("is_superuser", field(me, "is_superuser"))
        .field("is_platform_auditor", field(me, "is_platform_auditor"))
        .field("organizations", organization_names(me))
        .field("last_login", when(me, "last_login"))
        .field("created", when(me, "created"))
        .build()
}

fn organization_names(me: &Record) -> String {
    let names: Vec<&str> = me
        .summary_fields
        .related
        .get("organizations")
        .and_then(Value::as_array)
        .map(|orgs| {
            orgs.iter()
                .filter_map(|org| org.get("name").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn organizations_are_joined_or_none() {
        let member = Record::from_value(json!({
            "id": 1,
            "username": "admin",
            "summary_fields": {"organizations": [{"id": 1, "name": "Default"}, {"id": 2, "name": "Eng"}]}
        }))
        .expect("record");
        let loner = Record::from_value(json!({"id": 2, "username": "solo"})).expect("record");

        assert_eq!(organization_names(&member), "Default, Eng");
        assert_eq!(organization_names(&loner), "None");
    }
}
