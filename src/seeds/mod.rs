pub mod accounts_seed;
