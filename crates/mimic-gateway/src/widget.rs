// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single-page chat widget served at `/`.

use mimic_config::model::WebConfig;

/// Text shown around the chat box.
#[derive(Debug, Clone)]
pub struct WidgetPage {
    pub title: String,
    pub description: String,
    pub example_prompts: Vec<String>,
}

impl WidgetPage {
    /// The title defaults to "Chat with {persona_name}".
    pub fn from_config(config: &WebConfig, persona_name: &str) -> Self {
        Self {
            title: config
                .title
                .clone()
                .unwrap_or_else(|| format!("Chat with {persona_name}")),
            description: config.description.clone(),
            example_prompts: config.example_prompts.clone(),
        }
    }

    pub fn render(&self) -> String {
        let prompts: String = self
            .example_prompts
            .iter()
            .map(|p| {
                let p = escape_html(p);
                format!(r#"<button type="button" class="prompt" data-prompt="{p}">{p}</button>"#)
            })
            .collect::<Vec<_>>()
            .join("\n      ");

        TEMPLATE
            .replace("{{title}}", &escape_html(&self.title))
            .replace("{{description}}", &escape_html(&self.description))
            .replace("{{prompts}}", &prompts)
    }
}

/// Escapes text for use in HTML bodies and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}}</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 42rem; margin: 2rem auto; padding: 0 1rem; }
    #log { border: 1px solid #ccc; border-radius: 8px; height: 28rem; overflow-y: auto; padding: 0.75rem; }
    .msg { margin: 0.4rem 0; padding: 0.4rem 0.7rem; border-radius: 12px; max-width: 80%; white-space: pre-wrap; }
    .you { background: #dcf8c6; margin-left: auto; }
    .bot { background: #f1f0f0; }
    form { display: flex; gap: 0.5rem; margin-top: 0.75rem; }
    input { flex: 1; padding: 0.5rem; }
    .prompts { margin-top: 0.5rem; display: flex; gap: 0.4rem; flex-wrap: wrap; }
  </style>
</head>
<body>
  <h1>{{title}}</h1>
  <p>{{description}}</p>
  <div id="log"></div>
  <form id="chat">
    <input id="message" autocomplete="off" maxlength="4000" placeholder="Type a message...">
    <button type="submit">Send</button>
  </form>
  <div class="prompts">
      {{prompts}}
  </div>
  <script>
    let sessionId = null;
    const log = document.getElementById("log");
    const input = document.getElementById("message");

    function add(text, who) {
      const div = document.createElement("div");
      div.className = "msg " + who;
      div.textContent = text;
      log.appendChild(div);
      log.scrollTop = log.scrollHeight;
    }

    async function send(text) {
      text = text.trim();
      if (!text) return;
      add(text, "you");
      input.value = "";
      try {
        const res = await fetch("/v1/chat", {
          method: "POST",
          headers: { "Content-Type": "application/json" },
          body: JSON.stringify({ message: text, session_id: sessionId }),
        });
        const body = await res.json();
        if (!res.ok) { add(body.error || "request failed", "bot"); return; }
        sessionId = body.session_id;
        add(body.reply, "bot");
      } catch (e) {
        add("connection lost", "bot");
      }
    }

    document.getElementById("chat").addEventListener("submit", (e) => { e.preventDefault(); send(input.value); });
    document.querySelectorAll(".prompt").forEach((b) => b.addEventListener("click", () => send(b.dataset.prompt)));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_defaults_to_persona_name() {
        let page = WidgetPage::from_config(&WebConfig::default(), "Saman");
        assert_eq!(page.title, "Chat with Saman");
        let html = page.render();
        assert!(html.contains("<title>Chat with Saman</title>"));
        assert!(html.contains(r#"data-prompt="Kya hal ha?""#));
    }

    #[test]
    fn configured_text_is_escaped() {
        let page = WidgetPage {
            title: "<script>alert(1)</script>".into(),
            description: "Tom & \"Jerry\"".into(),
            example_prompts: vec!["it's".into()],
        };
        let html = page.render();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Tom &amp; &quot;Jerry&quot;"));
        assert!(html.contains("it&#39;s"));
    }
}
