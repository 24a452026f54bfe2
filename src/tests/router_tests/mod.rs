mod assignment_tests;
mod complaint_tests;
mod dashboard_tests;
mod status_tests;
