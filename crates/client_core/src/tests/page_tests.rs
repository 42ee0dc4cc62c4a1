use super::*;

#[test]
fn index_page_has_send_elements_only() {
    let page = PageDocument::index();
    for id in [PAGE_TITLE, SITE_HEADER, POST_FORM, RESPONSE_CONTAINER, CURRENT_YEAR] {
        assert!(page.has_element(id), "missing {id}");
    }
    assert!(!page.has_element(RECEIVED_DATA_DISPLAY));
    assert_eq!(page.is_hidden(RESPONSE_CONTAINER), Some(true));
}

#[test]
fn receive_page_has_display_elements_only() {
    let page = PageDocument::receive();
    for id in [RECEIVED_DATA_DISPLAY, DISPLAY_CONTENT_CONTAINER, CLEAR_ALL_DATA] {
        assert!(page.has_element(id), "missing {id}");
    }
    assert!(!page.has_element(POST_FORM));
}

#[test]
fn operations_on_missing_ids_are_ignored() {
    let mut page = PageDocument::receive();
    let before = page.clone();
    page.set_text("nope", "x");
    page.hide("nope");
    page.set_html("nope", "<b>x</b>".into());
    page.reset_form("nope");
    page.set_input("nope", "name", "Ann");
    assert_eq!(page, before);
}

#[test]
fn form_inputs_read_back_and_reset() {
    let mut page = PageDocument::index();
    assert_eq!(page.form_value(POST_FORM, "name"), None);

    page.set_input(POST_FORM, "name", "Ann");
    page.set_input(POST_FORM, "name", "Bea");
    assert_eq!(page.form_value(POST_FORM, "name").as_deref(), Some("Bea"));

    page.reset_form(POST_FORM);
    assert_eq!(page.form_value(POST_FORM, "name").as_deref(), Some(""));
}

#[test]
fn reveal_and_hide_toggle_visibility() {
    let mut page = PageDocument::index();
    page.reveal(RESPONSE_CONTAINER);
    assert_eq!(page.is_hidden(RESPONSE_CONTAINER), Some(false));

    page.hide(NAV_RECEIVE_TAB);
    assert_eq!(page.is_hidden(NAV_RECEIVE_TAB), Some(true));
    assert!(page
        .render()
        .contains(r#"id="nav-receive-tab" href="./receive.html" style="display: none""#));
}

#[test]
fn text_is_escaped_but_html_is_trusted() {
    let mut page = PageDocument::index();
    page.set_text(SITE_HEADER, "<Postbox & co>");
    page.set_html(RESPONSE_DATA, "<p>ok</p>".into());
    page.append_html(RESPONSE_DATA, "<p>more</p>".into());

    let rendered = page.render();
    assert!(rendered.contains("&lt;Postbox &amp; co&gt;"));
    assert!(rendered.contains("<div id=\"response-data\"><p>ok</p><p>more</p></div>"));
    assert_eq!(page.inner_html(RESPONSE_DATA), Some("<p>ok</p><p>more</p>"));
}

#[test]
fn replacing_body_removes_elements_but_keeps_head() {
    let mut page = PageDocument::index();
    page.set_text(PAGE_TITLE, "Postbox");
    page.replace_body("<div>gone</div>".into());

    assert!(!page.has_element(POST_FORM));
    assert_eq!(page.text(PAGE_TITLE), Some("Postbox"));
    assert_eq!(page.body_html(), Some("<div>gone</div>"));
    assert!(page.render().contains("<body><div>gone</div></body>"));
}
