use scraper::{ElementRef, Selector};

/// Parses a fixed selector; meant for `lazy_static` blocks, where every selector is a literal.
pub fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {selector}: {e:?}"))
}

pub fn select_all<'a>(scope: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    scope.select(selector).collect()
}

pub fn select_first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Text of the first element matching `selector` that has any non-whitespace content.
pub fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector)
        .map(|e| text_of(&e))
        .find(|e| !e.is_empty())
}

pub fn text_of(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Direct element children, in document order.
pub fn child_elements<'a>(element: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap).collect()
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::{css, first_text, truncate, child_elements, select_first};

    #[test]
    fn test_first_text_skips_empty() {
        let doc = Html::parse_fragment("<div><p class='a'>  </p><p class='a'>  Hello \n  world </p></div>");
        assert_eq!(first_text(doc.root_element(), &css("p.a")), Some("Hello world".to_string()));
        assert_eq!(first_text(doc.root_element(), &css("p.b")), None);
    }

    #[test]
    #[should_panic(expected = "invalid selector")]
    fn test_invalid_selector() {
        css("p[[");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("ab•cd", 3), "ab•");
        assert_eq!(truncate("ab", 10), "ab");
    }

    #[test]
    fn test_child_elements() {
        let doc = Html::parse_fragment("<div class='row'><div>1</div> text <span>2<b>3</b></span></div>");
        let row = select_first(doc.root_element(), &css("div.row")).unwrap();
        assert_eq!(child_elements(&row).len(), 2);
    }
}
