use super::*;

/// Handle into the arena. Stable for the lifetime of the document: merges
/// re-home preserved nodes instead of copying them, so a persisted element
/// keeps its `NodeId` (and its runtime state) across a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    // Runtime widget state, distinct from the parsed attributes.
    pub(crate) value: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub(crate) fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let element = Element {
            tag_name,
            attrs,
            value,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            if !id_attr.is_empty() {
                // first element with a given id wins, as in getElementById
                self.id_index.entry(id_attr).or_insert(id);
            }
        }
        id
    }

    pub(crate) fn create_detached_element(&mut self, tag_name: &str) -> NodeId {
        let element = Element {
            tag_name: tag_name.to_string(),
            attrs: HashMap::new(),
            value: String::new(),
        };
        self.create_node(None, NodeType::Element(element))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn is_element_named(&self, node_id: NodeId, tag: &str) -> bool {
        self.tag_name(node_id)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn children(&self, node_id: NodeId) -> Vec<NodeId> {
        self.nodes[node_id.0].children.clone()
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if node == self.root {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) {
        if self.element(node_id).is_none() {
            return;
        }
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| element.attrs.contains_key(name))
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        element.attrs.insert(name.to_string(), value.to_string());
        if name == "id" {
            self.rebuild_id_index();
        }
    }

    pub(crate) fn remove_attr(&mut self, node_id: NodeId, name: &str) {
        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        element.attrs.remove(name);
        if name == "id" {
            self.rebuild_id_index();
        }
    }

    pub(crate) fn attr_names(&self, node_id: NodeId) -> Vec<String> {
        let Some(element) = self.element(node_id) else {
            return Vec::new();
        };
        let mut names: Vec<String> = element.attrs.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Option<String> {
        self.element(node_id).map(|element| element.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) {
        if let Some(element) = self.element_mut(node_id) {
            element.value = value.to_string();
        }
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.can_have_children(parent) {
            return Err(Error::Runtime("append target cannot have children".into()));
        }
        if child == self.root || child == parent {
            return Err(Error::Runtime("invalid append node".into()));
        }

        // Prevent cycles: parent must not be inside child's subtree.
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(Error::Runtime("append would create a cycle".into()));
            }
            cursor = self.parent(node);
        }

        if let Some(old_parent) = self.parent(child) {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let reference = self.nodes[parent.0].children.first().copied();
        if let Some(reference) = reference {
            self.insert_before(parent, child, reference)
        } else {
            self.append_child(parent, child)
        }
    }

    pub(crate) fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<()> {
        if !self.can_have_children(parent) {
            return Err(Error::Runtime("insert target cannot have children".into()));
        }
        if child == self.root || child == parent {
            return Err(Error::Runtime("invalid insert node".into()));
        }
        if self.parent(reference) != Some(parent) {
            return Err(Error::Runtime(
                "insert reference is not a direct child".into(),
            ));
        }
        if child == reference {
            return Ok(());
        }

        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(Error::Runtime("insert would create a cycle".into()));
            }
            cursor = self.parent(node);
        }

        if let Some(old_parent) = self.parent(child) {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }

        let Some(index) = self.nodes[parent.0]
            .children
            .iter()
            .position(|id| *id == reference)
        else {
            return Err(Error::Runtime("insert reference is missing".into()));
        };

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn replace_with(&mut self, target: NodeId, child: NodeId) -> Result<()> {
        let Some(parent) = self.parent(target) else {
            return Ok(());
        };
        if target == child {
            return Ok(());
        }
        self.insert_before(parent, child, target)?;
        self.remove_child(parent, target)
    }

    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(Error::Runtime("remove target is not a direct child".into()));
        }
        self.nodes[parent.0].children.retain(|id| *id != child);
        self.nodes[child.0].parent = None;
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(Error::Runtime("cannot remove document root".into()));
        }
        let Some(parent) = self.parent(node) else {
            return Ok(());
        };
        self.remove_child(parent, node)
    }

    pub(crate) fn clone_subtree_from_dom(
        &mut self,
        source: &Dom,
        source_node: NodeId,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let node_type = match &source.nodes[source_node.0].node_type {
            NodeType::Document => {
                return Err(Error::Runtime("cannot clone a document node".into()));
            }
            NodeType::Element(element) => NodeType::Element(element.clone()),
            NodeType::Text(text) => NodeType::Text(text.clone()),
        };

        let node = self.create_node(parent, node_type);
        for child in &source.nodes[source_node.0].children {
            let _ = self.clone_subtree_from_dom(source, *child, Some(node))?;
        }
        if parent.is_some() {
            self.rebuild_id_index();
        }
        Ok(node)
    }

    fn can_have_children(&self, node_id: NodeId) -> bool {
        matches!(
            self.nodes.get(node_id.0).map(|n| &n.node_type),
            Some(NodeType::Document | NodeType::Element(_))
        )
    }

    pub(crate) fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            match &self.nodes[node.0].node_type {
                NodeType::Element(element) => {
                    if let Some(id) = element.attrs.get("id") {
                        if !id.is_empty() {
                            next.entry(id.clone()).or_insert(node);
                        }
                    }
                }
                NodeType::Document | NodeType::Text(_) => {}
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }

    // Document-shape accessors. Pages always carry the html/head/body
    // skeleton; `ensure_page_skeleton` builds it for fragments.

    pub(crate) fn document_element(&self) -> Option<NodeId> {
        self.nodes[self.root.0]
            .children
            .iter()
            .copied()
            .find(|child| self.is_element_named(*child, "html"))
    }

    pub(crate) fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.nodes[html.0]
            .children
            .iter()
            .copied()
            .find(|child| self.is_element_named(*child, "head"))
    }

    pub(crate) fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.nodes[html.0]
            .children
            .iter()
            .copied()
            .find(|child| self.is_element_named(*child, "body"))
    }

    pub(crate) fn ensure_page_skeleton(&mut self) -> Result<()> {
        let html = match self.document_element() {
            Some(html) => html,
            None => self.create_element(self.root, "html".into(), HashMap::new()),
        };
        let head = match self.head() {
            Some(head) => head,
            None => {
                let head = self.create_detached_element("head");
                self.prepend_child(html, head)?;
                head
            }
        };
        let body = match self.body() {
            Some(body) => body,
            None => {
                let body = self.create_detached_element("body");
                self.append_child(html, body)?;
                body
            }
        };

        let mut strays = Vec::new();
        for child in self.children(self.root) {
            if child != html {
                strays.push(child);
            }
        }
        for child in self.children(html) {
            if child != head && child != body {
                strays.push(child);
            }
        }
        for stray in strays {
            match &self.nodes[stray.0].node_type {
                NodeType::Text(text) if text.trim().is_empty() => {
                    self.remove_node(stray)?;
                }
                NodeType::Element(element) if is_metadata_tag(&element.tag_name) => {
                    self.append_child(head, stray)?;
                }
                NodeType::Document => {}
                _ => {
                    self.append_child(body, stray)?;
                }
            }
        }
        Ok(())
    }

    /// All elements in document order, connected nodes only.
    pub(crate) fn connected_elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    /// All elements in the subtree rooted at `node_id`, whether or not that
    /// subtree is still connected. Used to walk a detached old body.
    pub(crate) fn elements_in_subtree(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(node_id, &mut out);
        out
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
            out.push(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn scripts_in_order(&self) -> Vec<NodeId> {
        self.connected_elements()
            .into_iter()
            .filter(|id| self.is_element_named(*id, "script"))
            .collect()
    }

    pub(crate) fn stylesheet_links(&self, scope: NodeId) -> Vec<NodeId> {
        self.elements_in_subtree(scope)
            .into_iter()
            .filter(|id| {
                self.is_element_named(*id, "link")
                    && self
                        .attr(*id, "rel")
                        .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"))
            })
            .collect()
    }

    pub(crate) fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.connected_elements()
            .into_iter()
            .find(|id| self.attr(*id, name).as_deref() == Some(value))
    }

    pub(crate) fn meta_named(&self, name: &str) -> Option<NodeId> {
        self.connected_elements().into_iter().find(|id| {
            self.is_element_named(*id, "meta") && self.attr(*id, "name").as_deref() == Some(name)
        })
    }

    pub(crate) fn first_element_named(&self, tag: &str) -> Option<NodeId> {
        self.connected_elements()
            .into_iter()
            .find(|id| self.is_element_named(*id, tag))
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
            NodeType::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.tag_name);
                let mut attrs: Vec<_> = element.attrs.iter().collect();
                attrs.sort_by(|a, b| a.0.cmp(b.0));
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(v);
                    out.push('"');
                }
                out.push('>');
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
                out
            }
        }
    }
}

fn is_metadata_tag(tag: &str) -> bool {
    matches!(tag, "title" | "meta" | "link" | "style" | "base")
}
