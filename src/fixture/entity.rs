// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fixture entities and their field contracts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A record in the application's seeded test database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Semester,
    Parent,
    Student,
    Teacher,
    User,
    Class,
    Term,
    SchoolInfo,
    Announcement,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Semester,
        EntityKind::Parent,
        EntityKind::Student,
        EntityKind::Teacher,
        EntityKind::User,
        EntityKind::Class,
        EntityKind::Term,
        EntityKind::SchoolInfo,
        EntityKind::Announcement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Semester => "semester",
            EntityKind::Parent => "parent",
            EntityKind::Student => "student",
            EntityKind::Teacher => "teacher",
            EntityKind::User => "user",
            EntityKind::Class => "class",
            EntityKind::Term => "term",
            EntityKind::SchoolInfo => "school-info",
            EntityKind::Announcement => "announcement",
        }
    }

    /// Static contract for this kind
    pub fn contract(&self) -> &'static EntityContract {
        match self {
            EntityKind::Semester => &SEMESTER,
            EntityKind::Parent => &PARENT,
            EntityKind::Student => &STUDENT,
            EntityKind::Teacher => &TEACHER,
            EntityKind::User => &USER,
            EntityKind::Class => &CLASS,
            EntityKind::Term => &TERM,
            EntityKind::SchoolInfo => &SCHOOL_INFO,
            EntityKind::Announcement => &ANNOUNCEMENT,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted || (wanted == "schoolinfo" && *k == EntityKind::SchoolInfo))
            .ok_or_else(|| Error::config(format!("Unknown entity: {}", s)))
    }
}

/// How the admin UI reaches an entity's edit form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Menu link, then a manage list where one record is selected
    List {
        menu_link: &'static str,
        heading: &'static str,
        list_form: &'static str,
        /// Value of the `delete[]` checkbox to select; first one when None
        checkbox_value: Option<&'static str>,
        edit_button: &'static str,
    },
    /// Menu link straight to the edit form (single-record pages)
    Direct {
        menu_link: &'static str,
        heading: &'static str,
    },
}

impl Navigation {
    pub fn menu_link(&self) -> &'static str {
        match self {
            Navigation::List { menu_link, .. } | Navigation::Direct { menu_link, .. } => *menu_link,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Navigation::List { heading, .. } | Navigation::Direct { heading, .. } => *heading,
        }
    }
}

/// How a corrupted record is put back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePath {
    /// Replay the edit through the UI with the canonical values
    UiReplay,
    /// Raw authenticated POST carrying exactly these fields, `logout` last
    RawPost(&'static [(&'static str, &'static str)]),
}

/// Everything the harness knows about one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityContract {
    pub kind: EntityKind,
    pub navigation: Navigation,
    pub edit_form: &'static str,
    pub submit_button: &'static str,
    /// Editable fields in form order
    pub fields: &'static [&'static str],
    /// Seeded values, aligned with `fields`
    pub canonical: Option<&'static [&'static str]>,
    pub restore: RestorePath,
    /// Longest value the application stores in a field
    pub max_len: Option<usize>,
}

impl EntityContract {
    /// Canonical values paired with their field names
    pub fn canonical_fields(&self) -> Option<Vec<(&'static str, &'static str)>> {
        self.canonical
            .map(|values| self.fields.iter().copied().zip(values.iter().copied()).collect())
    }

    /// Check a value list against the field contract
    pub fn check_values(&self, values: &[&str]) -> Result<()> {
        if values.len() != self.fields.len() {
            return Err(Error::config(format!(
                "{} takes {} value(s) ({}), got {}",
                self.kind,
                self.fields.len(),
                self.fields.join(", "),
                values.len()
            )));
        }
        if let Some(max) = self.max_len {
            if let Some((field, value)) = self
                .fields
                .iter()
                .zip(values)
                .find(|(_, v)| v.chars().count() > max)
            {
                tracing::warn!(
                    entity = %self.kind,
                    field = %field,
                    len = value.chars().count(),
                    max,
                    "Value longer than the application stores"
                );
            }
        }
        Ok(())
    }
}

const STUDENT_RESTORE: &[(&str, &str)] = &[
    ("fname", "name"),
    ("mi", "s"),
    ("lname", "surname"),
    ("username", "3"),
    ("editstudent", "1"),
    ("studentid", "1"),
    ("page", "1"),
    ("page2", "2"),
    ("logout", ""),
];

static SEMESTER: EntityContract = EntityContract {
    kind: EntityKind::Semester,
    navigation: Navigation::List {
        menu_link: "Semesters",
        heading: "Manage Semesters",
        list_form: "semesters",
        checkbox_value: None,
        edit_button: "Edit",
    },
    edit_form: "editsemester",
    submit_button: "Edit Semester",
    fields: &["title"],
    canonical: Some(&["semester"]),
    restore: RestorePath::UiReplay,
    max_len: Some(15),
};

static PARENT: EntityContract = EntityContract {
    kind: EntityKind::Parent,
    navigation: Navigation::List {
        menu_link: "Parents",
        heading: "Manage Parents",
        list_form: "parents",
        checkbox_value: None,
        edit_button: "Edit",
    },
    edit_form: "editparent",
    submit_button: "Edit parent",
    fields: &["fname", "lname"],
    canonical: Some(&["parent", "parent"]),
    restore: RestorePath::UiReplay,
    max_len: None,
};

// The injected markup breaks the edit page badly enough that its hidden
// fields cannot be reached, so this record is restored out of band.
static STUDENT: EntityContract = EntityContract {
    kind: EntityKind::Student,
    navigation: Navigation::List {
        menu_link: "Students",
        heading: "Manage Students",
        list_form: "students",
        checkbox_value: None,
        edit_button: "Edit",
    },
    edit_form: "editstudent",
    submit_button: "Edit Student",
    fields: &["fname", "mi", "lname"],
    canonical: Some(&["name", "s", "surname"]),
    restore: RestorePath::RawPost(STUDENT_RESTORE),
    max_len: None,
};

static TEACHER: EntityContract = EntityContract {
    kind: EntityKind::Teacher,
    navigation: Navigation::List {
        menu_link: "Teachers",
        heading: "Manage Teachers",
        list_form: "teachers",
        checkbox_value: Some("1"),
        edit_button: "Edit",
    },
    edit_form: "editteacher",
    submit_button: "Edit teacher",
    fields: &["fname", "lname"],
    canonical: Some(&["teacher", "teacher"]),
    restore: RestorePath::UiReplay,
    max_len: None,
};

static USER: EntityContract = EntityContract {
    kind: EntityKind::User,
    navigation: Navigation::List {
        menu_link: "Users",
        heading: "Manage Users",
        list_form: "users",
        checkbox_value: Some("2"),
        edit_button: "Edit",
    },
    edit_form: "edituser",
    submit_button: "Edit user",
    fields: &["username", "password", "password2"],
    canonical: Some(&["teacher", "teacher", "teacher"]),
    restore: RestorePath::UiReplay,
    max_len: None,
};

static CLASS: EntityContract = EntityContract {
    kind: EntityKind::Class,
    navigation: Navigation::List {
        menu_link: "Classes",
        heading: "Manage Classes",
        list_form: "classes",
        checkbox_value: None,
        edit_button: "Edit",
    },
    edit_form: "editclass",
    submit_button: "Edit Class",
    fields: &["title"],
    canonical: None,
    restore: RestorePath::UiReplay,
    max_len: None,
};

static TERM: EntityContract = EntityContract {
    kind: EntityKind::Term,
    navigation: Navigation::List {
        menu_link: "Terms",
        heading: "Manage Terms",
        list_form: "terms",
        checkbox_value: None,
        edit_button: "Edit",
    },
    edit_form: "editterm",
    submit_button: "Edit Term",
    fields: &["title", "startdate", "enddate"],
    canonical: None,
    restore: RestorePath::UiReplay,
    max_len: None,
};

static SCHOOL_INFO: EntityContract = EntityContract {
    kind: EntityKind::SchoolInfo,
    navigation: Navigation::Direct {
        menu_link: "School",
        heading: "School Information",
    },
    edit_form: "info",
    submit_button: "Update",
    fields: &["schoolname", "sitemessage"],
    canonical: None,
    restore: RestorePath::UiReplay,
    max_len: None,
};

static ANNOUNCEMENT: EntityContract = EntityContract {
    kind: EntityKind::Announcement,
    navigation: Navigation::List {
        menu_link: "Announcements",
        heading: "Manage Announcements",
        list_form: "announcements",
        checkbox_value: None,
        edit_button: "Edit",
    },
    edit_form: "editannouncement",
    submit_button: "Edit Announcement",
    fields: &["title", "message"],
    canonical: None,
    restore: RestorePath::UiReplay,
    max_len: None,
};
