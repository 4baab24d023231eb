use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::{json, Value};
use storefront_core::config::LoadOptions;
use storefront_core::notify::{ConfirmOptions, Notifier};
use storefront_core::{ApplicationError, CheckoutOutcome, ErrorClass, StorefrontSession};

use crate::commands::{command_runtime, connect, CommandResult};

const COMMAND: &str = "checkout";

/// One `--item ID:QTY` argument. Both halves are kept as typed so the
/// session applies the same parsing a form control would.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSpec {
    pub selection: String,
    pub quantity: String,
}

impl ItemSpec {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let (selection, quantity) =
            raw.split_once(':').with_context(|| format!("expected ID:QTY, got `{raw}`"))?;
        if selection.trim().is_empty() {
            bail!("missing product id in `{raw}`");
        }
        Ok(Self { selection: selection.trim().to_owned(), quantity: quantity.trim().to_owned() })
    }
}

#[derive(Clone, Debug, Default)]
pub struct CheckoutArgs {
    pub items: Vec<ItemSpec>,
    pub remove: Vec<usize>,
    pub dry_run: bool,
}

pub fn run(
    options: &LoadOptions,
    args: CheckoutArgs,
    notifier: Arc<dyn Notifier>,
) -> CommandResult {
    let (config, api) = match connect(COMMAND, options) {
        Ok(connected) => connected,
        Err(failure) => return failure,
    };
    let runtime = match command_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::classified(
                COMMAND,
                ErrorClass::Transport,
                format!("failed to initialize async runtime: {error}"),
                None,
            )
        }
    };

    runtime.block_on(async move {
        let mut session = StorefrontSession::new(Arc::new(api), notifier.clone())
            .with_history_path(config.api.history_path.clone());

        if let Err(error) = session.load_catalog().await {
            return CommandResult::classified(
                COMMAND,
                ErrorClass::Transport,
                format!("catalog unavailable: {error}"),
                None,
            );
        }

        let mut rejected = Vec::new();
        for item in &args.items {
            if let Err(error) = session.add_selected(&item.selection, &item.quantity).await {
                rejected.push(json!({
                    "item": format!("{}:{}", item.selection, item.quantity),
                    "reason": error.to_string(),
                }));
            }
        }
        for index in &args.remove {
            session.remove_from_cart(*index);
        }

        let cart = session.view().clone();
        let details = |extra: Option<(&'static str, Value)>| {
            let mut details = json!({ "cart": cart, "rejected": rejected });
            if let (Some((key, value)), Some(map)) = (extra, details.as_object_mut()) {
                map.insert(key.to_owned(), value);
            }
            Some(details)
        };

        if args.dry_run {
            return CommandResult::success_with_details(
                COMMAND,
                format!("dry run: {} cart lines, total ${}", cart.rows.len(), cart.total),
                details(None),
            );
        }

        if !cart.is_empty() {
            let prompt =
                format!("Place order for {} cart lines totaling ${}?", cart.rows.len(), cart.total);
            let options =
                ConfirmOptions::default().title("Place order").ok_text("Place order").danger(false);
            if !notifier.confirm(&prompt, options).await {
                return CommandResult::success_with_details(
                    COMMAND,
                    "checkout cancelled",
                    details(None),
                );
            }
        }

        match session.submit_order().await {
            CheckoutOutcome::Succeeded { message, redirect_to } => {
                let redirect = Value::String(config.api.endpoint(&redirect_to));
                CommandResult::success_with_details(
                    COMMAND,
                    message,
                    details(Some(("redirect_to", redirect))),
                )
            }
            CheckoutOutcome::EmptyCart => CommandResult::classified(
                COMMAND,
                ErrorClass::UserInput,
                ApplicationError::EmptyCart.user_message(),
                details(None),
            ),
            CheckoutOutcome::Failed { message } => CommandResult::classified(
                COMMAND,
                ErrorClass::BusinessRejection,
                message,
                details(None),
            ),
            CheckoutOutcome::TransportError { error } => {
                CommandResult::classified(COMMAND, ErrorClass::Transport, error, details(None))
            }
        }
    })
}
