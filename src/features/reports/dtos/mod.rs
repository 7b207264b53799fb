mod report_dto;

pub use report_dto::{
    AssignmentResponseDto, CreateReportDto, NamedRefDto, ReportResponseDto, UpdateReportStatusDto,
};
