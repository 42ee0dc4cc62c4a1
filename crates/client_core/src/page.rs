use crate::html::escape;

pub const PAGE_TITLE: &str = "page-title";
pub const SITE_HEADER: &str = "site-header";
pub const POST_SECTION_TITLE: &str = "post-section-title";
pub const RECEIVE_SECTION_TITLE: &str = "receive-section-title";
pub const CURRENT_YEAR: &str = "current-year";
pub const NAV_RECEIVE_TAB: &str = "nav-receive-tab";
pub const POST_FORM: &str = "post-form";
pub const RESPONSE_CONTAINER: &str = "response-container";
pub const RESPONSE_DATA: &str = "response-data";
pub const RECEIVED_DATA_DISPLAY: &str = "received-data-display";
pub const DISPLAY_CONTENT_CONTAINER: &str = "display-content-container";
pub const CLEAR_ALL_DATA: &str = "clear-all-data";

const HIDDEN_CLASS: &str = "hidden";

/// Element tree the controller writes into. Every operation addressed at a
/// missing id is a no-op.
pub trait Page {
    fn has_element(&self, id: &str) -> bool;
    fn set_text(&mut self, id: &str, text: &str);
    /// Hides the element with an inline `display: none`.
    fn hide(&mut self, id: &str);
    /// Removes the `hidden` class.
    fn reveal(&mut self, id: &str);
    /// Replaces the element's content with trusted markup.
    fn set_html(&mut self, id: &str, html: String);
    fn append_html(&mut self, id: &str, html: String);
    /// Drops the whole body and shows `html` instead.
    fn replace_body(&mut self, html: String);
    /// Value of input `name` in form `form_id`; `None` if there is no such input.
    fn form_value(&self, form_id: &str, name: &str) -> Option<String>;
    fn reset_form(&mut self, form_id: &str);
}

/// Blocking user prompts.
pub trait Dialogs {
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub id: Option<String>,
    pub tag: &'static str,
    pub classes: Vec<String>,
    pub attrs: Vec<(&'static str, String)>,
    pub text: String,
    pub html: Option<String>,
    pub display_none: bool,
    pub inputs: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    fn attr(mut self, name: &'static str, value: &str) -> Self {
        self.attrs.push((name, value.to_string()));
        self
    }

    fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.display_none || self.classes.iter().any(|c| c == HIDDEN_CLASS)
    }

    fn find(&self, id: &str) -> Option<&Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    fn render(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        if let Some(id) = &self.id {
            out.push_str(&format!(" id=\"{}\"", escape(id)));
        }
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&self.classes.join(" "))));
        }
        for (name, value) in &self.attrs {
            out.push_str(&format!(" {name}=\"{}\"", escape(value)));
        }
        if self.display_none {
            out.push_str(" style=\"display: none\"");
        }
        out.push('>');

        out.push_str(&escape(&self.text));
        if let Some(html) = &self.html {
            out.push_str(html);
        }
        for (name, value) in &self.inputs {
            out.push_str(&format!(
                "<input name=\"{}\" value=\"{}\">",
                escape(name),
                escape(value)
            ));
        }
        for child in &self.children {
            child.render(out);
        }

        out.push_str(&format!("</{}>", self.tag));
    }
}

/// In-memory page with the same element ids as the site's two pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    head: Vec<Element>,
    body: Vec<Element>,
    body_html: Option<String>,
}

impl PageDocument {
    /// The send page: configuration-driven form plus a response area.
    pub fn index() -> Self {
        let main = Element::new("main")
            .child(Element::new("h2").id(POST_SECTION_TITLE))
            .child(
                Element::new("form")
                    .id(POST_FORM)
                    .child(Element::new("button").attr("type", "submit").text("Send")),
            )
            .child(
                Element::new("div")
                    .id(RESPONSE_CONTAINER)
                    .class(HIDDEN_CLASS)
                    .child(Element::new("div").id(RESPONSE_DATA)),
            );
        Self::with_main(main)
    }

    /// The receive page: stored records and the clear action.
    pub fn receive() -> Self {
        let main = Element::new("main").child(
            Element::new("section")
                .id(RECEIVED_DATA_DISPLAY)
                .child(Element::new("h2").id(RECEIVE_SECTION_TITLE))
                .child(
                    Element::new("button")
                        .id(CLEAR_ALL_DATA)
                        .attr("type", "button")
                        .text("Clear All Data"),
                )
                .child(Element::new("div").id(DISPLAY_CONTENT_CONTAINER)),
        );
        Self::with_main(main)
    }

    fn with_main(main: Element) -> Self {
        let header = Element::new("header")
            .child(Element::new("h1").id(SITE_HEADER))
            .child(
                Element::new("nav")
                    .child(
                        Element::new("a")
                            .attr("href", "./index.html")
                            .text("Send Request"),
                    )
                    .child(
                        Element::new("a")
                            .id(NAV_RECEIVE_TAB)
                            .attr("href", "./receive.html")
                            .text("Receive Data"),
                    ),
            );
        let footer = Element::new("footer")
            .child(Element::new("span").text("\u{a9} "))
            .child(Element::new("span").id(CURRENT_YEAR));

        Self {
            head: vec![Element::new("title").id(PAGE_TITLE)],
            body: vec![header, main, footer],
            body_html: None,
        }
    }

    /// Declares (or fills) an input on a form, as a user typing into it would.
    pub fn set_input(&mut self, form_id: &str, name: &str, value: &str) {
        let Some(form) = self.find_mut(form_id) else {
            return;
        };
        match form.inputs.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => form.inputs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.head
            .iter()
            .chain(self.body.iter())
            .find_map(|element| element.find(id))
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.element(id).map(|element| element.text.as_str())
    }

    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.html.as_deref())
    }

    pub fn is_hidden(&self, id: &str) -> Option<bool> {
        self.element(id).map(Element::is_hidden)
    }

    pub fn body_html(&self) -> Option<&str> {
        self.body_html.as_deref()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.head
            .iter_mut()
            .chain(self.body.iter_mut())
            .find_map(|element| element.find_mut(id))
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\">");
        for element in &self.head {
            element.render(&mut out);
        }
        out.push_str("</head>\n<body>");
        match &self.body_html {
            Some(html) => out.push_str(html),
            None => {
                for element in &self.body {
                    element.render(&mut out);
                }
            }
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}

impl Page for PageDocument {
    fn has_element(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(element) = self.find_mut(id) {
            element.text = text.to_string();
            element.html = None;
            element.children.clear();
        }
    }

    fn hide(&mut self, id: &str) {
        if let Some(element) = self.find_mut(id) {
            element.display_none = true;
        }
    }

    fn reveal(&mut self, id: &str) {
        if let Some(element) = self.find_mut(id) {
            element.classes.retain(|c| c != HIDDEN_CLASS);
        }
    }

    fn set_html(&mut self, id: &str, html: String) {
        if let Some(element) = self.find_mut(id) {
            element.text.clear();
            element.children.clear();
            element.html = Some(html);
        }
    }

    fn append_html(&mut self, id: &str, html: String) {
        if let Some(element) = self.find_mut(id) {
            element.html.get_or_insert_with(String::new).push_str(&html);
        }
    }

    fn replace_body(&mut self, html: String) {
        self.body.clear();
        self.body_html = Some(html);
    }

    fn form_value(&self, form_id: &str, name: &str) -> Option<String> {
        self.element(form_id)?
            .inputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
    }

    fn reset_form(&mut self, form_id: &str) {
        if let Some(form) = self.find_mut(form_id) {
            for (_, value) in &mut form.inputs {
                value.clear();
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
