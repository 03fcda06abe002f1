/// Reusable popup components

use patternfly_yew::prelude::*;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct DomainItemProps {
    pub domain: String,
    pub index: usize,
    pub on_remove: Callback<usize>,
}

/// List key for a domain row; stored lists may hold the same domain twice
pub fn domain_item_key(index: usize, domain: &str) -> String {
    format!("{}-{}", index, domain)
}

/// One monitored domain with its remove button
#[function_component(DomainItem)]
pub fn domain_item(props: &DomainItemProps) -> Html {
    let onclick = {
        let on_remove = props.on_remove.clone();
        let index = props.index;
        Callback::from(move |_: MouseEvent| on_remove.emit(index))
    };

    html! {
        <div class="domain-item">
            <span class="domain-name">{&props.domain}</span>
            <Button {onclick} variant={ButtonVariant::Link}>
                {"Remove"}
            </Button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ActiveConnectionsProps {
    pub hostnames: Vec<String>,
}

#[function_component(ActiveConnections)]
pub fn active_connections(props: &ActiveConnectionsProps) -> Html {
    html! {
        <div>
            <p class="section-title">
                {format!("Active connections: {}", props.hostnames.len())}
            </p>
            if props.hostnames.is_empty() {
                <div class="empty-list">{"No active connections"}</div>
            } else {
                {for props.hostnames.iter().map(|hostname| html! {
                    <div class="active-domain">{hostname}</div>
                })}
            }
        </div>
    }
}

#[derive(Clone, PartialEq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Properties, PartialEq)]
pub struct StatusMessageProps {
    pub text: String,
    pub kind: MessageKind,
}

/// Transient feedback shown at the top of the popup
#[function_component(StatusMessage)]
pub fn status_message(props: &StatusMessageProps) -> Html {
    let alert_type = match props.kind {
        MessageKind::Success => AlertType::Success,
        MessageKind::Error => AlertType::Danger,
    };

    html! {
        <Alert r#type={alert_type} title={props.text.clone()} inline={true}>
        </Alert>
    }
}
