mod bounds;
mod gain;
mod round_trip;
mod transfer;
