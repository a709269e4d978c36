use super::*;

// Deliberately small selector dialect: tag, #id, .class, [attr], [attr=value],
// and the descendant combinator. Enough for the crate's own assertions;
// anything richer is rejected as unsupported rather than silently mismatched.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
}

pub(crate) fn parse_selector(selector: &str) -> Result<Vec<SelectorStep>> {
    let mut steps = Vec::new();
    for part in selector.split_whitespace() {
        steps.push(parse_step(part, selector)?);
    }
    if steps.is_empty() {
        return Err(Error::UnsupportedSelector(selector.to_string()));
    }
    Ok(steps)
}

fn parse_step(part: &str, original: &str) -> Result<SelectorStep> {
    let unsupported = || Error::UnsupportedSelector(original.to_string());
    let mut step = SelectorStep::default();
    let bytes = part.as_bytes();
    let mut i;

    let tag_end = bytes
        .iter()
        .position(|b| matches!(b, b'#' | b'.' | b'['))
        .unwrap_or(bytes.len());
    if tag_end > 0 {
        let tag = &part[..tag_end];
        if tag != "*" {
            if !tag.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
                return Err(unsupported());
            }
            step.tag = Some(tag.to_ascii_lowercase());
        }
    }
    i = tag_end;

    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                let start = i + 1;
                let end = next_token_end(bytes, start);
                if end == start {
                    return Err(unsupported());
                }
                step.id = Some(part[start..end].to_string());
                i = end;
            }
            b'.' => {
                let start = i + 1;
                let end = next_token_end(bytes, start);
                if end == start {
                    return Err(unsupported());
                }
                step.classes.push(part[start..end].to_string());
                i = end;
            }
            b'[' => {
                let close = part[i..].find(']').ok_or_else(unsupported)? + i;
                let inner = &part[i + 1..close];
                let condition = match inner.split_once('=') {
                    Some((key, raw)) => {
                        let value = raw.trim_matches(|c| c == '"' || c == '\'');
                        SelectorAttrCondition::Eq {
                            key: key.to_ascii_lowercase(),
                            value: value.to_string(),
                        }
                    }
                    None => SelectorAttrCondition::Exists {
                        key: inner.to_ascii_lowercase(),
                    },
                };
                step.attrs.push(condition);
                i = close + 1;
            }
            _ => return Err(unsupported()),
        }
    }

    Ok(step)
}

fn next_token_end(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b'_')) {
        i += 1;
    }
    i
}

fn step_matches(dom: &Dom, node_id: NodeId, step: &SelectorStep) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };
    if let Some(tag) = &step.tag {
        if !element.tag_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if element.attrs.get("id") != Some(id) {
            return false;
        }
    }
    for class in &step.classes {
        let has = element
            .attrs
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class));
        if !has {
            return false;
        }
    }
    for condition in &step.attrs {
        match condition {
            SelectorAttrCondition::Exists { key } => {
                if !element.attrs.contains_key(key) {
                    return false;
                }
            }
            SelectorAttrCondition::Eq { key, value } => {
                if element.attrs.get(key) != Some(value) {
                    return false;
                }
            }
        }
    }
    true
}

fn matches_with_ancestry(dom: &Dom, node_id: NodeId, steps: &[SelectorStep]) -> bool {
    let Some((last, ancestors)) = steps.split_last() else {
        return false;
    };
    if !step_matches(dom, node_id, last) {
        return false;
    }
    let mut remaining = ancestors;
    let mut cursor = dom.parent(node_id);
    while let Some(node) = cursor {
        let Some((step, rest)) = remaining.split_last() else {
            return true;
        };
        if step_matches(dom, node, step) {
            remaining = rest;
        }
        cursor = dom.parent(node);
    }
    remaining.is_empty()
}

pub(crate) fn select_all(dom: &Dom, selector: &str) -> Result<Vec<NodeId>> {
    let steps = parse_selector(selector)?;
    // a bare #id selector hits the id index directly
    if let [step] = steps.as_slice() {
        if step.tag.is_none() && step.classes.is_empty() && step.attrs.is_empty() {
            if let Some(id) = &step.id {
                return Ok(dom
                    .by_id(id)
                    .filter(|node| dom.is_connected(*node))
                    .into_iter()
                    .collect());
            }
        }
    }
    Ok(dom
        .connected_elements()
        .into_iter()
        .filter(|id| matches_with_ancestry(dom, *id, &steps))
        .collect())
}

pub(crate) fn select_one(dom: &Dom, selector: &str) -> Result<NodeId> {
    select_all(dom, selector)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
}
