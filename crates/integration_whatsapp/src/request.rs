//! Cloud API request bodies
//!
//! Maps a domain `OutboundMessage` onto the JSON shape expected by
//! `POST /{phone_number_id}/messages`. One message yields exactly one body.

use domain::{MessageContent, OutboundMessage, ReplyButton};
use serde::Serialize;

/// Message send request
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(flatten)]
    payload: Payload<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Payload<'a> {
    Text { text: TextContent<'a> },
    Image { image: MediaObject<'a> },
    Document { document: MediaObject<'a> },
    Audio { audio: MediaObject<'a> },
    Location { location: LocationObject<'a> },
    Interactive { interactive: Interactive<'a> },
    Template { template: Template<'a> },
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    body: &'a str,
    preview_url: bool,
}

#[derive(Debug, Serialize)]
struct MediaObject<'a> {
    link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct LocationObject<'a> {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Interactive<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<InteractiveHeader<'a>>,
    body: InteractiveText<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<InteractiveText<'a>>,
    action: InteractiveAction<'a>,
}

#[derive(Debug, Serialize)]
struct InteractiveHeader<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct InteractiveText<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct InteractiveAction<'a> {
    buttons: Vec<ActionButton<'a>>,
}

#[derive(Debug, Serialize)]
struct ActionButton<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: &'a ReplyButton,
}

#[derive(Debug, Serialize)]
struct Template<'a> {
    name: &'a str,
    language: TemplateLanguage<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<TemplateComponent<'a>>,
}

#[derive(Debug, Serialize)]
struct TemplateLanguage<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
struct TemplateComponent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: Vec<TemplateParameter<'a>>,
}

#[derive(Debug, Serialize)]
struct TemplateParameter<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Build the Cloud API request body for a message
pub fn build_request(message: &OutboundMessage) -> SendMessageRequest<'_> {
    let payload = match &message.content {
        MessageContent::Text { body, preview_url } => Payload::Text {
            text: TextContent {
                body,
                preview_url: *preview_url,
            },
        },
        MessageContent::Image { link, caption } => Payload::Image {
            image: MediaObject {
                link,
                caption: caption.as_deref(),
                filename: None,
            },
        },
        MessageContent::Document {
            link,
            caption,
            filename,
        } => Payload::Document {
            document: MediaObject {
                link,
                caption: caption.as_deref(),
                filename: filename.as_deref(),
            },
        },
        MessageContent::Audio { link } => Payload::Audio {
            audio: MediaObject {
                link,
                caption: None,
                filename: None,
            },
        },
        MessageContent::Location {
            latitude,
            longitude,
            name,
            address,
        } => Payload::Location {
            location: LocationObject {
                latitude: *latitude,
                longitude: *longitude,
                name: name.as_deref(),
                address: address.as_deref(),
            },
        },
        MessageContent::Buttons {
            body,
            buttons,
            header,
            footer,
        } => Payload::Interactive {
            interactive: Interactive {
                kind: "button",
                header: header
                    .as_deref()
                    .map(|text| InteractiveHeader { kind: "text", text }),
                body: InteractiveText { text: body },
                footer: footer.as_deref().map(|text| InteractiveText { text }),
                action: InteractiveAction {
                    buttons: buttons
                        .iter()
                        .map(|reply| ActionButton {
                            kind: "reply",
                            reply,
                        })
                        .collect(),
                },
            },
        },
        MessageContent::Template {
            name,
            language,
            parameters,
        } => {
            let components = if parameters.is_empty() {
                Vec::new()
            } else {
                vec![TemplateComponent {
                    kind: "body",
                    parameters: parameters
                        .iter()
                        .map(|text| TemplateParameter { kind: "text", text })
                        .collect(),
                }]
            };
            Payload::Template {
                template: Template {
                    name,
                    language: TemplateLanguage { code: language },
                    components,
                },
            }
        },
    };

    SendMessageRequest {
        messaging_product: "whatsapp",
        recipient_type: "individual",
        to: message.recipient.as_str(),
        payload,
    }
}
