//! Outbound message formatting and the callback payload codec.

use common::OrderId;
use domain::{DeliveryMethod, OrderSession, OrderStatus, SessionStage};
use registry::OrderRecord;

use crate::services::transport::{Button, Keyboard};

/// A typed inline-keyboard callback payload.
///
/// Unknown payloads fail to parse and are dropped with a diagnostic by
/// the facade; the codec never guesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Customer approves the reviewed configuration.
    Approve,

    /// Customer declines the reviewed configuration.
    Decline,

    /// Customer picks a delivery method.
    Delivery(DeliveryMethod),

    /// Customer steps one form stage back.
    Back,

    /// Customer confirms the order on the last stage.
    ConfirmOrder,

    /// Customer abandons the session.
    CancelSession,

    /// Admin marks an order ready.
    Ready(OrderId),

    /// Admin marks an order delivered.
    Delivered(OrderId),

    /// Admin cancels an order.
    CancelOrder(OrderId),
}

impl CallbackAction {
    /// Encodes the action as a callback payload string.
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Approve => "approve".to_string(),
            CallbackAction::Decline => "decline".to_string(),
            CallbackAction::Delivery(method) => format!("delivery:{method}"),
            CallbackAction::Back => "back".to_string(),
            CallbackAction::ConfirmOrder => "confirm".to_string(),
            CallbackAction::CancelSession => "cancel".to_string(),
            CallbackAction::Ready(id) => format!("ready:{id}"),
            CallbackAction::Delivered(id) => format!("delivered:{id}"),
            CallbackAction::CancelOrder(id) => format!("cancel_order:{id}"),
        }
    }

    /// Parses a callback payload string.
    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            "approve" => return Some(CallbackAction::Approve),
            "decline" => return Some(CallbackAction::Decline),
            "back" => return Some(CallbackAction::Back),
            "confirm" => return Some(CallbackAction::ConfirmOrder),
            "cancel" => return Some(CallbackAction::CancelSession),
            _ => {}
        }

        let (kind, arg) = payload.split_once(':')?;
        if arg.is_empty() {
            return None;
        }
        match kind {
            "delivery" => DeliveryMethod::parse(arg).map(CallbackAction::Delivery),
            "ready" => Some(CallbackAction::Ready(OrderId::new(arg))),
            "delivered" => Some(CallbackAction::Delivered(OrderId::new(arg))),
            "cancel_order" => Some(CallbackAction::CancelOrder(OrderId::new(arg))),
            _ => None,
        }
    }
}

/// Approve/decline keyboard attached to decision prompts and reminders.
pub(crate) fn decision_keyboard() -> Keyboard {
    Keyboard::row(vec![
        Button::new("✅ Yes", CallbackAction::Approve.encode()),
        Button::new("❌ No", CallbackAction::Decline.encode()),
    ])
}

/// Keyboard for the current form stage.
pub(crate) fn form_keyboard(stage: SessionStage) -> Keyboard {
    let nav = vec![
        Button::new("⬅ Back", CallbackAction::Back.encode()),
        Button::new("✖ Cancel", CallbackAction::CancelSession.encode()),
    ];
    match stage {
        SessionStage::NeedDeliveryChoice => Keyboard::new(vec![
            vec![
                Button::new(
                    "🏃 Pickup",
                    CallbackAction::Delivery(DeliveryMethod::Pickup).encode(),
                ),
                Button::new(
                    "🚚 Courier",
                    CallbackAction::Delivery(DeliveryMethod::Courier).encode(),
                ),
            ],
            nav,
        ]),
        SessionStage::NeedDeliveryConfirm => Keyboard::new(vec![
            vec![Button::new(
                "✅ Confirm order",
                CallbackAction::ConfirmOrder.encode(),
            )],
            nav,
        ]),
        _ => Keyboard::row(nav),
    }
}

/// Renders the order form for the session's current stage.
pub(crate) fn form_prompt(session: &OrderSession, error: Option<&str>) -> String {
    let mut text = String::from("📋 Order form\n");
    text.push_str(&format!("{}\n", session.snapshot().summary));
    if let Some(total) = session.total() {
        text.push_str(&format!("Total: {total}\n"));
    }
    text.push('\n');

    if let Some(name) = session.name() {
        text.push_str(&format!("Name: {name}\n"));
    }
    if let Some(phone) = session.phone() {
        text.push_str(&format!("Phone: {phone}\n"));
    }
    if let Some(location) = session.location() {
        text.push_str(&format!("Location: {}\n", location.display_text()));
    }
    if let Some(delivery) = session.delivery() {
        text.push_str(&format!("Delivery: {delivery}\n"));
    }

    if let Some(error) = error {
        text.push_str(&format!("\n⚠ {error}\n"));
    }

    let ask = match session.stage() {
        SessionStage::NeedName => "Please send your full name.",
        SessionStage::NeedPhone => "Please send your phone number.",
        SessionStage::NeedLocation => {
            "Please send your address, or share coordinates as lat,lon."
        }
        SessionStage::NeedDeliveryChoice => "Choose a delivery method.",
        SessionStage::NeedDeliveryConfirm => "Everything correct? Confirm to place the order.",
    };
    text.push('\n');
    text.push_str(ask);
    text
}

/// Approval request posted to the admin channel.
pub(crate) fn approval_request(customer: common::CustomerId, summary: &str) -> String {
    format!("🔔 Review requested for customer {customer}:\n\n{summary}")
}

/// Decision prompt sent to the customer after an admin reply.
///
/// The admin text is forwarded verbatim; the repriced quote follows when
/// it differs.
pub(crate) fn decision_prompt(admin_text: &str, repriced: &str) -> String {
    if admin_text == repriced {
        format!("Your order was reviewed:\n\n{admin_text}\n\nShall we proceed?")
    } else {
        format!("Your order was reviewed:\n\n{admin_text}\n\n{repriced}\n\nShall we proceed?")
    }
}

/// Active-orders board entry for the fulfillment channel.
pub(crate) fn board_text(record: &OrderRecord) -> String {
    let mut text = format!("📦 Order {}\n", record.order_id);
    text.push_str(&format!(
        "Customer: {} ({})\n",
        record.customer_name, record.phone
    ));
    text.push_str(&format!("Location: {}\n", record.location));
    text.push_str(&format!("{}\n", record.summary));
    if let Some(total) = record.total {
        text.push_str(&format!("Total: {total}\n"));
    }
    text.push_str(&format!("Delivery: {}\n", record.delivery));
    text.push_str(&format!("Status: {}", record.status));
    text
}

/// Board keyboard for the record's current status, if any actions remain.
pub(crate) fn board_keyboard(record: &OrderRecord) -> Option<Keyboard> {
    match record.status {
        OrderStatus::Processing => Some(Keyboard::row(vec![
            Button::new(
                "✅ Ready",
                CallbackAction::Ready(record.order_id.clone()).encode(),
            ),
            Button::new(
                "✖ Cancel",
                CallbackAction::CancelOrder(record.order_id.clone()).encode(),
            ),
        ])),
        _ => None,
    }
}

/// Sanitized summary forwarded to the confirmed-orders channel.
///
/// Strips internal customer identifiers and action buttons down to what
/// fulfillment staff need.
pub(crate) fn sanitized_summary(record: &OrderRecord) -> String {
    let mut text = format!("✅ Order {}\n", record.order_id);
    text.push_str(&format!(
        "{} — {}\n",
        record.customer_name, record.phone
    ));
    text.push_str(&format!("Location: {}\n", record.location));
    text.push_str(&format!("{}\n", record.summary));
    if let Some(total) = record.total {
        text.push_str(&format!("Total: {total}\n"));
    }
    text.push_str(&format!("Delivery: {}", record.delivery));
    if let Some(eta) = &record.eta {
        text.push_str(&format!("\nETA: {eta}"));
    }
    text
}

/// Keyboard attached to the confirmed-orders forward.
pub(crate) fn confirmed_keyboard(order_id: &OrderId) -> Keyboard {
    Keyboard::row(vec![Button::new(
        "📬 Delivered",
        CallbackAction::Delivered(order_id.clone()).encode(),
    )])
}

/// Prompt asking the admin for an estimated arrival, sent as the
/// delivery order goes ready.
pub(crate) fn eta_prompt_text(record: &OrderRecord) -> String {
    format!(
        "🚚 Order {} is ready for delivery.\nReply to this message with the ETA.",
        record.order_id
    )
}

/// Terminal text replacing the board entry's action buttons.
pub(crate) fn board_terminal_text(record: &OrderRecord) -> String {
    format!("{}\n— {} —", board_text(record), record.status)
}

/// Customer notification for a ready order.
pub(crate) fn ready_customer_text(record: &OrderRecord) -> String {
    match record.delivery {
        DeliveryMethod::Pickup => format!(
            "✅ Order {} is ready for pickup. See you soon!",
            record.order_id
        ),
        DeliveryMethod::Courier => format!(
            "✅ Order {} is ready and will be dispatched shortly.",
            record.order_id
        ),
    }
}

/// Customer notification for an order on the way.
pub(crate) fn onway_customer_text(record: &OrderRecord, eta: &str) -> String {
    format!("🚚 Order {} is on the way. ETA: {eta}", record.order_id)
}

/// Customer notification for a delivered order.
pub(crate) fn delivered_customer_text(record: &OrderRecord) -> String {
    format!("📬 Order {} delivered. Thank you!", record.order_id)
}

/// Customer notification for a canceled order.
pub(crate) fn canceled_customer_text(record: &OrderRecord) -> String {
    format!("❌ Order {} was canceled.", record.order_id)
}

/// Confirmation echo sent to the customer on submission.
pub(crate) fn confirmation_text(record: &OrderRecord) -> String {
    let mut text = format!(
        "🎉 Order {} accepted and is being processed.\n{}\n",
        record.order_id, record.summary
    );
    if let Some(total) = record.total {
        text.push_str(&format!("Total: {total}\n"));
    }
    text.push_str(&format!("Delivery: {}", record.delivery));
    text
}

/// Corrective notice for a reply outside the expected thread.
pub(crate) fn stray_reply_notice() -> String {
    "Please reply in the order's own thread so the ETA reaches the right customer.".to_string()
}

/// Sent when a decision arrives with no resolvable source.
pub(crate) fn nothing_to_decide_text() -> String {
    "We couldn't find an order configuration to confirm. Please start over.".to_string()
}

/// Apology sent when a collaborator call failed.
pub(crate) fn apology_text() -> String {
    "Sorry, something went wrong on our side. Please try again.".to_string()
}

/// Re-engagement message templates; one is picked pseudo-randomly when
/// no operator-provided content accompanies the reminder.
pub(crate) const REMINDER_TEMPLATES: [&str; 3] = [
    "Still thinking it over? Your order is one tap away.",
    "Your configuration is saved — shall we finish the order?",
    "We kept your order ready. Want to complete it?",
];

/// Wraps reminder content with the decision question.
pub(crate) fn reminder_text(content: &str) -> String {
    format!("{content}\n\nShall we proceed?")
}
