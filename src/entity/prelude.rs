//! 预导入模块，方便使用

pub use super::centers::{ActiveModel as CenterActiveModel, Entity as Centers, Model as CenterModel};
pub use super::group_students::{
    ActiveModel as GroupStudentActiveModel, Entity as GroupStudents, Model as GroupStudentModel,
};
pub use super::groups::{ActiveModel as GroupActiveModel, Entity as Groups, Model as GroupModel};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::tasks::{ActiveModel as TaskActiveModel, Entity as Tasks, Model as TaskModel};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
