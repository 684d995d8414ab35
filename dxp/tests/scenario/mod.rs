mod acquisition;
mod gain;
mod run;
mod trace;
