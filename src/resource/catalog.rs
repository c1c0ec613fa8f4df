//! The declarative resource catalog. Each entry replaces what the original
//! site expressed as a separate schema/router/validator triple.

use super::{
    DefaultValue, Derived, FieldKind, FieldSpec, Features, RefJoin, ResourceDescriptor, SortKey,
    ToggleTarget,
};
use crate::social;

pub const SKILL_CATEGORIES: &[&str] = &[
    "Frontend Development",
    "Backend Development",
    "Database",
    "DevOps",
    "Mobile Development",
    "Programming Languages",
    "Tools & Technologies",
    "Design",
    "Soft Skills",
    "Other",
];

pub const PROJECT_CATEGORIES: &[&str] = &[
    "Web Application",
    "Mobile Application",
    "API",
    "Library",
    "CLI Tool",
    "Other",
];

pub const PROJECT_STATUSES: &[&str] = &["completed", "in-progress", "planned"];

pub const TECHNOLOGY_CATEGORIES: &[&str] =
    &["Language", "Framework", "Database", "Tool", "Platform", "Other"];

pub const SOCIAL_PLATFORMS: &[&str] = &[
    "github", "linkedin", "twitter", "instagram", "youtube", "dribbble", "behance", "medium",
    "dev", "website", "other",
];

pub const MESSAGE_STATUSES: &[&str] = &["new", "read", "replied", "archived"];

pub const CONTACT_AVAILABILITY: &[&str] = &["available", "busy", "unavailable"];

pub static SKILLS: ResourceDescriptor = ResourceDescriptor {
    name: "skills",
    table: "skills",
    fields: &[
        FieldSpec {
            name: "name",
            label: "Name",
            kind: FieldKind::Text { max: 50 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "category",
            label: "Category",
            kind: FieldKind::Enum { values: SKILL_CATEGORIES },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "level",
            label: "Skill level",
            kind: FieldKind::Integer { min: 0, max: 100 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "icon",
            label: "Icon",
            kind: FieldKind::Text { max: 50 },
            required: false,
            default: None,
        },
    ],
    search_fields: &["name"],
    filters: &["category"],
    sort: &[SortKey::PositionAsc, SortKey::CreatedDesc],
    derived: &[Derived::ProficiencyLabel { source: "level", target: "proficiencyLabel" }],
    reference: None,
    prepare: None,
    features: Features {
        reorder: true,
        toggle: Some(ToggleTarget::ActiveFlag),
        like_counter: false,
        view_counter: false,
        category_routes: false,
        counters: &[],
    },
};

pub static PROJECTS: ResourceDescriptor = ResourceDescriptor {
    name: "projects",
    table: "projects",
    fields: &[
        FieldSpec {
            name: "title",
            label: "Title",
            kind: FieldKind::Text { max: 100 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "description",
            label: "Description",
            kind: FieldKind::Text { max: 2000 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "technologies",
            label: "Technologies",
            kind: FieldKind::TextArray { max_item: 30, non_empty: true },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "githubUrl",
            label: "GitHub URL",
            kind: FieldKind::Url,
            required: false,
            default: None,
        },
        FieldSpec {
            name: "liveUrl",
            label: "Live URL",
            kind: FieldKind::Url,
            required: false,
            default: None,
        },
        FieldSpec {
            name: "imageUrl",
            label: "Image URL",
            kind: FieldKind::Url,
            required: false,
            default: None,
        },
        FieldSpec {
            name: "category",
            label: "Category",
            kind: FieldKind::Enum { values: PROJECT_CATEGORIES },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "status",
            label: "Status",
            kind: FieldKind::Enum { values: PROJECT_STATUSES },
            required: false,
            default: Some(DefaultValue::Str("completed")),
        },
        FieldSpec {
            name: "featured",
            label: "Featured",
            kind: FieldKind::Flag,
            required: false,
            default: Some(DefaultValue::Bool(false)),
        },
        FieldSpec {
            name: "startDate",
            label: "Start date",
            kind: FieldKind::Date,
            required: false,
            default: None,
        },
        FieldSpec {
            name: "endDate",
            label: "End date",
            kind: FieldKind::Date,
            required: false,
            default: None,
        },
    ],
    search_fields: &["title", "description"],
    filters: &["category", "status", "featured"],
    sort: &[SortKey::PositionAsc, SortKey::CreatedDesc],
    derived: &[],
    reference: None,
    prepare: None,
    features: Features {
        reorder: true,
        toggle: Some(ToggleTarget::DocFlag("featured")),
        like_counter: true,
        view_counter: true,
        category_routes: true,
        counters: &["views", "likes"],
    },
};

pub static EDUCATION: ResourceDescriptor = ResourceDescriptor {
    name: "education",
    table: "education",
    fields: &[
        FieldSpec {
            name: "institution",
            label: "Institution",
            kind: FieldKind::Text { max: 100 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "degree",
            label: "Degree",
            kind: FieldKind::Text { max: 100 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "fieldOfStudy",
            label: "Field of study",
            kind: FieldKind::Text { max: 100 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "startDate",
            label: "Start date",
            kind: FieldKind::Date,
            required: true,
            default: None,
        },
        FieldSpec {
            name: "endDate",
            label: "End date",
            kind: FieldKind::Date,
            required: false,
            default: None,
        },
        FieldSpec {
            name: "grade",
            label: "Grade",
            kind: FieldKind::Text { max: 20 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "description",
            label: "Description",
            kind: FieldKind::Text { max: 1000 },
            required: false,
            default: None,
        },
    ],
    search_fields: &["institution", "degree"],
    filters: &[],
    sort: &[SortKey::PositionAsc, SortKey::DocDateDesc("startDate")],
    derived: &[Derived::Duration { start: "startDate", end: "endDate", target: "duration" }],
    reference: None,
    prepare: None,
    features: Features {
        reorder: true,
        toggle: None,
        like_counter: false,
        view_counter: false,
        category_routes: false,
        counters: &[],
    },
};

pub static EXPERIENCE: ResourceDescriptor = ResourceDescriptor {
    name: "experience",
    table: "experience",
    fields: &[
        FieldSpec {
            name: "company",
            label: "Company",
            kind: FieldKind::Text { max: 100 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "position",
            label: "Position",
            kind: FieldKind::Text { max: 100 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "location",
            label: "Location",
            kind: FieldKind::Text { max: 100 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "startDate",
            label: "Start date",
            kind: FieldKind::Date,
            required: true,
            default: None,
        },
        FieldSpec {
            name: "endDate",
            label: "End date",
            kind: FieldKind::Date,
            required: false,
            default: None,
        },
        FieldSpec {
            name: "current",
            label: "Current",
            kind: FieldKind::Flag,
            required: false,
            default: Some(DefaultValue::Bool(false)),
        },
        FieldSpec {
            name: "description",
            label: "Description",
            kind: FieldKind::Text { max: 2000 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "technologies",
            label: "Technologies",
            kind: FieldKind::TextArray { max_item: 30, non_empty: false },
            required: false,
            default: None,
        },
    ],
    search_fields: &["company", "position"],
    filters: &[],
    sort: &[SortKey::PositionAsc, SortKey::DocDateDesc("startDate")],
    derived: &[Derived::Duration { start: "startDate", end: "endDate", target: "duration" }],
    reference: None,
    prepare: None,
    features: Features {
        reorder: true,
        toggle: None,
        like_counter: false,
        view_counter: false,
        category_routes: false,
        counters: &[],
    },
};

pub static CERTIFICATIONS: ResourceDescriptor = ResourceDescriptor {
    name: "certifications",
    table: "certifications",
    fields: &[
        FieldSpec {
            name: "name",
            label: "Name",
            kind: FieldKind::Text { max: 150 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "issuer",
            label: "Issuer",
            kind: FieldKind::Text { max: 100 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "issueDate",
            label: "Issue date",
            kind: FieldKind::Date,
            required: true,
            default: None,
        },
        FieldSpec {
            name: "expiryDate",
            label: "Expiry date",
            kind: FieldKind::Date,
            required: false,
            default: None,
        },
        FieldSpec {
            name: "credentialId",
            label: "Credential ID",
            kind: FieldKind::Text { max: 100 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "credentialUrl",
            label: "Credential URL",
            kind: FieldKind::Url,
            required: false,
            default: None,
        },
    ],
    search_fields: &["name", "issuer"],
    filters: &[],
    sort: &[SortKey::DocDateDesc("issueDate")],
    derived: &[Derived::Expired { source: "expiryDate", target: "isExpired" }],
    reference: None,
    prepare: None,
    features: Features {
        reorder: false,
        toggle: None,
        like_counter: false,
        view_counter: false,
        category_routes: false,
        counters: &[],
    },
};

pub static TECHNOLOGIES: ResourceDescriptor = ResourceDescriptor {
    name: "technologies",
    table: "technologies",
    fields: &[
        FieldSpec {
            name: "name",
            label: "Name",
            kind: FieldKind::Text { max: 50 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "category",
            label: "Category",
            kind: FieldKind::Enum { values: TECHNOLOGY_CATEGORIES },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "proficiency",
            label: "Proficiency",
            kind: FieldKind::Integer { min: 0, max: 100 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "icon",
            label: "Icon",
            kind: FieldKind::Text { max: 50 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "projects",
            label: "Projects",
            kind: FieldKind::RefArray,
            required: false,
            default: None,
        },
    ],
    search_fields: &["name"],
    filters: &["category"],
    sort: &[SortKey::PositionAsc, SortKey::CreatedDesc],
    derived: &[Derived::ProficiencyLabel { source: "proficiency", target: "proficiencyLabel" }],
    reference: Some(RefJoin { field: "projects", resource: "projects", label_field: "title" }),
    prepare: None,
    features: Features {
        reorder: true,
        toggle: None,
        like_counter: false,
        view_counter: false,
        category_routes: false,
        counters: &[],
    },
};

pub static SOCIAL_LINKS: ResourceDescriptor = ResourceDescriptor {
    name: "social",
    table: "social_links",
    fields: &[
        FieldSpec {
            name: "platform",
            label: "Platform",
            kind: FieldKind::Enum { values: SOCIAL_PLATFORMS },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "url",
            label: "URL",
            kind: FieldKind::Url,
            required: true,
            default: None,
        },
        FieldSpec {
            name: "username",
            label: "Username",
            kind: FieldKind::Text { max: 50 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "icon",
            label: "Icon",
            kind: FieldKind::Text { max: 50 },
            required: false,
            default: None,
        },
    ],
    search_fields: &[],
    filters: &["platform"],
    sort: &[SortKey::PositionAsc, SortKey::CreatedDesc],
    derived: &[],
    reference: None,
    prepare: Some(social::derive_username),
    features: Features {
        reorder: true,
        toggle: None,
        like_counter: false,
        view_counter: false,
        category_routes: false,
        counters: &[],
    },
};

pub static MESSAGES: ResourceDescriptor = ResourceDescriptor {
    name: "messages",
    table: "messages",
    fields: &[
        FieldSpec {
            name: "name",
            label: "Name",
            kind: FieldKind::Text { max: 100 },
            required: true,
            default: None,
        },
        FieldSpec {
            name: "email",
            label: "Email",
            kind: FieldKind::Email,
            required: true,
            default: None,
        },
        FieldSpec {
            name: "subject",
            label: "Subject",
            kind: FieldKind::Text { max: 200 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "message",
            label: "Message",
            kind: FieldKind::Text { max: 5000 },
            required: true,
            default: None,
        },
    ],
    search_fields: &["name", "email", "subject"],
    filters: &["status"],
    sort: &[SortKey::CreatedDesc],
    derived: &[],
    reference: None,
    prepare: None,
    features: Features {
        reorder: false,
        toggle: None,
        like_counter: false,
        view_counter: false,
        category_routes: false,
        counters: &[],
    },
};

pub static CONTACT: ResourceDescriptor = ResourceDescriptor {
    name: "contact",
    table: "contact",
    fields: &[
        FieldSpec {
            name: "email",
            label: "Email",
            kind: FieldKind::Email,
            required: true,
            default: Some(DefaultValue::Str("hello@example.com")),
        },
        FieldSpec {
            name: "phone",
            label: "Phone",
            kind: FieldKind::Text { max: 30 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "location",
            label: "Location",
            kind: FieldKind::Text { max: 200 },
            required: false,
            default: None,
        },
        FieldSpec {
            name: "availability",
            label: "Availability",
            kind: FieldKind::Enum { values: CONTACT_AVAILABILITY },
            required: false,
            default: Some(DefaultValue::Str("available")),
        },
        FieldSpec {
            name: "resumeUrl",
            label: "Resume URL",
            kind: FieldKind::Url,
            required: false,
            default: None,
        },
    ],
    search_fields: &[],
    filters: &[],
    sort: &[SortKey::CreatedDesc],
    derived: &[],
    reference: None,
    prepare: None,
    features: Features {
        reorder: false,
        toggle: None,
        like_counter: false,
        view_counter: false,
        category_routes: false,
        counters: &["resumeDownloads"],
    },
};

/// Every content resource, in mount order. Messages and contact are included
/// for storage DDL and validation even though they mount custom routers.
pub static RESOURCES: &[&ResourceDescriptor] = &[
    &SKILLS,
    &PROJECTS,
    &EDUCATION,
    &EXPERIENCE,
    &CERTIFICATIONS,
    &TECHNOLOGIES,
    &SOCIAL_LINKS,
    &MESSAGES,
    &CONTACT,
];

/// Resources served by the generic CRUD router factory
pub static GENERIC_RESOURCES: &[&ResourceDescriptor] = &[
    &SKILLS,
    &PROJECTS,
    &EDUCATION,
    &EXPERIENCE,
    &CERTIFICATIONS,
    &TECHNOLOGIES,
    &SOCIAL_LINKS,
];

pub fn by_name(name: &str) -> Option<&'static ResourceDescriptor> {
    RESOURCES.iter().find(|r| r.name == name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = RESOURCES.iter().map(|r| r.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), RESOURCES.len());
    }

    #[test]
    fn every_search_and_filter_field_is_plain_text_reachable() {
        for resource in RESOURCES {
            for field in resource.search_fields {
                assert!(
                    resource.field(field).is_some(),
                    "{}: search field {} not declared",
                    resource.name,
                    field
                );
            }
        }
    }

    #[test]
    fn generic_resources_exclude_custom_routers() {
        assert!(GENERIC_RESOURCES.iter().all(|r| r.name != "messages" && r.name != "contact"));
        assert!(by_name("messages").is_some());
        assert!(by_name("contact").is_some());
        assert!(by_name("unknown").is_none());
    }

    #[test]
    fn technologies_declare_project_join() {
        let join = TECHNOLOGIES.reference.unwrap();
        assert_eq!(join.field, "projects");
        assert_eq!(join.resource, "projects");
        assert_eq!(join.label_field, "title");
    }
}
