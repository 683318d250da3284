pub mod circuit_solver;
pub mod index_manager;
pub mod local_search_solver;
pub mod search_budget;
pub mod solver_params;
