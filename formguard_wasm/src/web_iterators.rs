use wasm_bindgen::JsCast;


// `querySelectorAll` returns nodes, but with element selectors every node is an element. Anything
// else (should it ever appear) is skipped.
pub struct ElementListIterator {
    list: web_sys::NodeList,
    index: u32,
}

impl From<web_sys::NodeList> for ElementListIterator {
    fn from(list: web_sys::NodeList) -> Self { Self { list, index: 0 } }
}

impl Iterator for ElementListIterator {
    type Item = web_sys::Element;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.list.length() {
            let node = self.list.item(self.index);
            self.index += 1;
            if let Some(element) = node.and_then(|n| n.dyn_into::<web_sys::Element>().ok()) {
                return Some(element);
            }
        }
        None
    }
}

pub struct HtmlCollectionIterator {
    collection: web_sys::HtmlCollection,
    index: u32,
}

impl From<web_sys::HtmlCollection> for HtmlCollectionIterator {
    fn from(collection: web_sys::HtmlCollection) -> Self { Self { collection, index: 0 } }
}

impl Iterator for HtmlCollectionIterator {
    type Item = web_sys::Element;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.collection.item(self.index);
        self.index += 1;
        item
    }
}
