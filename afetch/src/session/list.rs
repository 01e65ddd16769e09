//! Selectable list of releases or assets.

use crate::catalog::AssetDescriptor;
use crate::github::Release;

/// Title shown while choosing a release.
pub const RELEASE_TITLE: &str = "Select release:";

/// Title shown while choosing assets.
pub const ASSET_TITLE: &str =
    "Select assets to download (press space to select, enter to download):";

/// One row of the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Release(Release),
    Asset(AssetDescriptor),
}

impl ListItem {
    /// Row text.
    pub fn label(&self) -> String {
        match self {
            ListItem::Release(release) if release.name.is_empty() => {
                format!("[{}]", release.tag_name)
            }
            ListItem::Release(release) => format!("[{}] {}", release.tag_name, release.name),
            ListItem::Asset(asset) => asset.label.clone(),
        }
    }
}

/// Cursor and selection state over a list of [`ListItem`]s.
#[derive(Debug, Clone, Default)]
pub struct ListView {
    title: &'static str,
    items: Vec<ListItem>,
    cursor: usize,
    selected: Vec<bool>,
    multi_select: bool,
}

impl ListView {
    /// Single-choice list of releases.
    pub fn releases(releases: Vec<Release>) -> Self {
        Self::build(
            RELEASE_TITLE,
            releases.into_iter().map(ListItem::Release).collect(),
            false,
        )
    }

    /// Multi-select list of assets.
    pub fn assets(assets: Vec<AssetDescriptor>) -> Self {
        Self::build(
            ASSET_TITLE,
            assets.into_iter().map(ListItem::Asset).collect(),
            true,
        )
    }

    fn build(title: &'static str, items: Vec<ListItem>, multi_select: bool) -> Self {
        let selected = vec![false; items.len()];
        Self {
            title,
            items,
            cursor: 0,
            selected,
            multi_select,
        }
    }

    pub fn title(&self) -> &str {
        self.title
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_multi_select(&self) -> bool {
        self.multi_select
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Flip the selection of the highlighted row (multi-select lists only).
    pub fn toggle(&mut self) {
        if !self.multi_select {
            return;
        }
        if let Some(flag) = self.selected.get_mut(self.cursor) {
            *flag = !*flag;
        }
    }

    /// Select every row (multi-select lists only).
    pub fn select_all(&mut self) {
        if self.multi_select {
            self.selected.iter_mut().for_each(|flag| *flag = true);
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }

    /// Selected assets in list order.
    pub fn selected_assets(&self) -> Vec<AssetDescriptor> {
        self.items
            .iter()
            .zip(&self.selected)
            .filter(|(_, &selected)| selected)
            .filter_map(|(item, _)| match item {
                ListItem::Asset(asset) => Some(asset.clone()),
                ListItem::Release(_) => None,
            })
            .collect()
    }

    /// The highlighted row.
    pub fn current(&self) -> Option<&ListItem> {
        self.items.get(self.cursor)
    }

    pub fn current_asset(&self) -> Option<&AssetDescriptor> {
        match self.current()? {
            ListItem::Asset(asset) => Some(asset),
            ListItem::Release(_) => None,
        }
    }

    pub fn current_release(&self) -> Option<&Release> {
        match self.current()? {
            ListItem::Release(release) => Some(release),
            ListItem::Asset(_) => None,
        }
    }
}
