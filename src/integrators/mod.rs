pub mod leapfrog;
