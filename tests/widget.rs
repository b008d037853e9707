#[path = "widget/activation_flow.rs"]
mod activation_flow;
#[path = "widget/consent_gate.rs"]
mod consent_gate;
#[path = "widget/support.rs"]
mod support;
