use anyhow::{bail, Context};
use rust_decimal::Decimal;
use serde_json::json;
use storefront_core::order_form::{OrderForm, QuantityField};
use storefront_core::ErrorClass;

use crate::commands::CommandResult;

const COMMAND: &str = "summary";

/// One `--field LABEL:MIN:MAX:PRICE=VALUE` argument. The label may itself
/// contain `:`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: QuantityField,
    pub value: String,
}

impl FieldSpec {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let (definition, value) = raw
            .split_once('=')
            .with_context(|| format!("expected LABEL:MIN:MAX:PRICE=VALUE, got `{raw}`"))?;

        let parts: Vec<&str> = definition.rsplitn(4, ':').collect();
        let [price, max, min, label] = parts.as_slice() else {
            bail!("expected LABEL:MIN:MAX:PRICE before `=` in `{raw}`");
        };

        let min: i64 = min.trim().parse().with_context(|| format!("invalid min `{min}`"))?;
        let max: i64 = max.trim().parse().with_context(|| format!("invalid max `{max}`"))?;
        let unit_price: Decimal =
            price.trim().parse().with_context(|| format!("invalid price `{price}`"))?;
        if min > max {
            bail!("min {min} is greater than max {max} in `{raw}`");
        }

        let label = match label.trim() {
            "" => QuantityField::default().label,
            label => label.to_owned(),
        };
        Ok(Self { field: QuantityField { label, min, max, unit_price }, value: value.to_owned() })
    }
}

#[derive(Clone, Debug, Default)]
pub struct SummaryArgs {
    pub fields: Vec<FieldSpec>,
    pub raw: bool,
}

pub fn run(args: SummaryArgs) -> CommandResult {
    let (fields, values): (Vec<_>, Vec<_>) =
        args.fields.into_iter().map(|field| (field.field, field.value)).unzip();
    let mut form = OrderForm::new(fields);

    for (index, value) in values.iter().enumerate() {
        if args.raw {
            form.set_raw(index, value.as_str());
        } else {
            form.input(index, value);
        }
    }

    let entered: Vec<&str> = form.entries().iter().map(|entry| entry.value.as_str()).collect();
    let summary = match form.summary() {
        Ok(summary) => summary,
        Err(error) => {
            return CommandResult::classified(
                COMMAND,
                ErrorClass::UserInput,
                error.to_string(),
                Some(json!({ "values": entered })),
            );
        }
    };
    let details = json!({
        "summary": summary.text(),
        "total": summary.total_text(),
        "values": entered,
    });

    match form.validate() {
        Ok(total_qty) => CommandResult::success_with_details(
            COMMAND,
            format!("order form is ready to submit ({total_qty} items)"),
            Some(details),
        ),
        Err(error) => {
            CommandResult::classified(COMMAND, ErrorClass::UserInput, error.to_string(), Some(details))
        }
    }
}
