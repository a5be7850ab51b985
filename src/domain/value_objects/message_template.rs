use crate::domain::value_objects::campaigns::CampaignRecipient;

/// Round-robin template selection: the Nth processed recipient gets
/// `templates[N % len]`, independent of who the recipient is.
pub fn select_template(templates: &[String], cursor: usize) -> Option<(usize, &str)> {
    if templates.is_empty() {
        return None;
    }
    let index = cursor % templates.len();
    Some((index, templates[index].as_str()))
}

/// Substitutes the recipient's fields into the template. Tokens are matched
/// case-insensitively; a token whose field is absent renders as empty string,
/// never as the literal token. Values are substituted as-is, no escaping.
pub fn render_template(template: &str, recipient: &CampaignRecipient) -> String {
    let substitutions = [
        ("%nome", recipient.name.as_str()),
        ("%telefone", recipient.phone.as_str()),
        ("%email", recipient.email.as_deref().unwrap_or("")),
        ("%veiculo", recipient.vehicle_model.as_deref().unwrap_or("")),
        ("%placa", recipient.vehicle_plate.as_deref().unwrap_or("")),
        ("%cidade", recipient.city.as_deref().unwrap_or("")),
    ];

    let mut rendered = template.to_string();
    for (token, value) in substitutions {
        rendered = replace_token_ignore_case(&rendered, token, value);
    }
    rendered
}

// Tokens are ASCII, so lowercasing does not shift byte offsets.
fn replace_token_ignore_case(text: &str, token: &str, replacement: &str) -> String {
    let lowered_text = text.to_ascii_lowercase();
    let lowered_token = token.to_ascii_lowercase();

    let mut output = String::with_capacity(text.len());
    let mut copied_until = 0;
    let mut search_from = 0;
    while let Some(offset) = lowered_text[search_from..].find(&lowered_token) {
        let match_start = search_from + offset;
        output.push_str(&text[copied_until..match_start]);
        output.push_str(replacement);
        copied_until = match_start + token.len();
        search_from = copied_until;
    }
    output.push_str(&text[copied_until..]);
    output
}
