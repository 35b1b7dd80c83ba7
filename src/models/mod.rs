pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyFilters, CompanyNew, CompanyWithJobs};
pub use job::{Job, JobFilters, JobNew, JobWithCompany};
pub use user::{User, UserNew, UserRegister, UserWithJobs};
