//! # Domain Entities
//!
//! Records managed by the admin backend. Each maps to one document
//! collection and implements [`Resource`](crate::domain::resource::Resource)
//! so the CRUD template can drive it.
//!
//! - **Admin**: administrator account used to sign in
//! - **BlogPost**: article with tags and a published flag
//! - **Project**: portfolio project with links and technologies
//! - **Skill**: named skill grouped by category
//! - **Education**: degree or course entry
//! - **Experience**: work history entry
//!
//! Every content entity carries a `slug` derived from its title (or name for
//! skills). Slug and title are unique within their collection.

mod admin;
mod blog_post;
mod education;
mod experience;
mod project;
mod skill;

pub use admin::{Admin, AdminPatch, NewAdmin};
pub use blog_post::{BlogPost, BlogPostFilter, BlogPostPatch, NewBlogPost};
pub use education::{Education, EducationPatch, NewEducation};
pub use experience::{Experience, ExperienceFilter, ExperiencePatch, NewExperience};
pub use project::{NewProject, Project, ProjectFilter, ProjectPatch};
pub use skill::{NewSkill, Skill, SkillFilter, SkillPatch};
