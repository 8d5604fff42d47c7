//! Adds a helper that walks a whole folder hierarchy, one `FindFolder` page at a time.
//!
//! The transport is not part of this crate: anything that can answer a `FindFolder` request
//! implements [`FolderFinder`] and gets [`FolderHierarchyExt::load_all_folders`] for free.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::types::{
    ExtendedPropertyDefinition, FindFoldersResults, FolderId, MapiPropertyType, PropertySet,
    PropertyValue,
};

/// The number of folders requested per page.
pub const PAGE_SIZE: usize = 100;

/// MAPI tag of `PidTagMessageSizeExtended`, the total size of the messages in a folder.
pub const PID_TAG_MESSAGE_SIZE_EXTENDED: u16 = 0x0E08;

/// `PidTagMessageSizeExtended` as an extended property.
pub fn message_size_extended() -> ExtendedPropertyDefinition {
    ExtendedPropertyDefinition::with_tag(PID_TAG_MESSAGE_SIZE_EXTENDED, MapiPropertyType::Long)
}

/// Which folders below the parent a search covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FolderTraversal {
    /// Direct children only.
    Shallow,
    /// All descendants.
    Deep,
    /// Folders that have been soft-deleted.
    SoftDeleted,
}

/// One page of a `FindFolder` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderView {
    pub page_size: usize,
    /// Index of the first folder of the page.
    pub offset: i64,
    pub traversal: FolderTraversal,
    pub property_set: PropertySet,
}

impl FolderView {
    /// The first page of a shallow search for `page_size` folders.
    pub fn new(page_size: usize) -> Self {
        FolderView {
            page_size,
            offset: 0,
            traversal: FolderTraversal::Shallow,
            property_set: PropertySet::first_class_properties(),
        }
    }

    pub fn with_traversal(mut self, traversal: FolderTraversal) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_property_set(mut self, property_set: PropertySet) -> Self {
        self.property_set = property_set;
        self
    }
}

/// Something that can issue `FindFolder` requests.
pub trait FolderFinder {
    /// Find one page of the folders below `parent`.
    fn find_folders(&mut self, parent: &FolderId, view: &FolderView)
        -> Result<FindFoldersResults>;
}

/// Size and item count of a folder, named by its path from the search root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderInfo {
    /// Display names from the search root down to the folder, joined with `/`.
    pub full_name: String,
    /// Total size of the folder's messages in bytes, 0 if the server did not report it.
    pub folder_size: i64,
    pub items_count: i64,
}

/// Folder hierarchy helpers for every [`FolderFinder`].
pub trait FolderHierarchyExt: FolderFinder {
    /// Load every folder below `root`, keyed by full name.
    ///
    /// Folders are requested in pages of [`PAGE_SIZE`] with a deep traversal. A folder whose
    /// parent was returned earlier is named `parent/child`; other folders are named by their
    /// display name alone. Two folders with the same full name are an
    /// [`Error::DuplicateFolder`], and a page that has more results but no offset for them
    /// is an [`Error::MissingPageOffset`].
    fn load_all_folders(
        &mut self,
        root: impl Into<FolderId>,
    ) -> Result<HashMap<String, FolderInfo>> {
        let root = root.into();
        let size_property = message_size_extended();
        let mut view = FolderView::new(PAGE_SIZE)
            .with_traversal(FolderTraversal::Deep)
            .with_property_set(
                PropertySet::first_class_properties().with_extended(size_property.clone()),
            );

        let mut folders = HashMap::new();
        let mut full_names: HashMap<String, String> = HashMap::new();
        loop {
            let page = self.find_folders(&root, &view)?;
            debug!(
                "loaded {} folders below {} at offset {}",
                page.len(),
                root,
                view.offset
            );

            for folder in &page {
                let display_name = folder.display_name().unwrap_or_default();
                let parent_name = folder
                    .parent_folder_id()
                    .and_then(|id| full_names.get(&id.unique_id));
                let full_name = match parent_name {
                    Some(parent_name) => format!("{}/{}", parent_name, display_name),
                    None => display_name.to_owned(),
                };

                let info = FolderInfo {
                    full_name: full_name.clone(),
                    folder_size: folder
                        .extended_property(&size_property)
                        .and_then(PropertyValue::as_integer)
                        .unwrap_or(0),
                    items_count: folder.total_count().unwrap_or(0),
                };
                match folders.entry(full_name.clone()) {
                    Entry::Occupied(_) => return Err(Error::DuplicateFolder(full_name)),
                    Entry::Vacant(entry) => {
                        entry.insert(info);
                    }
                }
                if let Some(id) = folder.id() {
                    full_names.insert(id.unique_id.clone(), full_name);
                }
            }

            if !page.more_available {
                return Ok(folders);
            }
            view.offset = page.next_page_offset.ok_or(Error::MissingPageOffset)?;
        }
    }
}

impl<T: FolderFinder + ?Sized> FolderHierarchyExt for T {}
