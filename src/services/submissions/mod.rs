pub mod create;
pub mod detail;
pub mod grade;
pub mod list;
pub mod progress;
pub mod workflow;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::submissions::requests::{
    AllSubmissionsParams, GradeSubmissionRequest, SubmissionListParams,
};

pub use workflow::{Caller, GradeInput, ScreenedUpload, SubmissionWorkflow};

pub struct SubmissionService {
    workflow: Option<Arc<SubmissionWorkflow>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { workflow: None }
    }

    pub(crate) fn get_workflow(&self, request: &HttpRequest) -> Result<Arc<SubmissionWorkflow>> {
        match &self.workflow {
            Some(workflow) => Ok(workflow.clone()),
            None => super::shared::<SubmissionWorkflow>(request, "SubmissionWorkflow"),
        }
    }

    // 当前调用者与工作流引擎
    pub(crate) fn resolve(&self, request: &HttpRequest) -> Result<(Caller, Arc<SubmissionWorkflow>)> {
        let user = super::current_user(request)?;
        Ok((Caller::from(&user), self.get_workflow(request)?))
    }

    /// 学生提交作业
    pub async fn submit(
        &self,
        request: &HttpRequest,
        task_id: i64,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        create::submit_assignment(self, request, task_id, payload).await
    }

    /// 教师评分
    pub async fn grade(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        body: GradeSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, request, submission_id, body).await
    }

    /// 某任务下的提交
    pub async fn list_for_task(
        &self,
        request: &HttpRequest,
        task_id: i64,
        params: SubmissionListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_task_submissions(self, request, task_id, params).await
    }

    /// 教师名下全部提交
    pub async fn list_all(
        &self,
        request: &HttpRequest,
        params: AllSubmissionsParams,
    ) -> ActixResult<HttpResponse> {
        list::list_all_submissions(self, request, params).await
    }

    pub async fn get_single(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, request, submission_id).await
    }

    pub async fn progress(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        progress::get_progress(self, request).await
    }

    pub async fn my_submissions(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        progress::list_my_submissions(self, request).await
    }
}
